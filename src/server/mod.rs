//! HTTP boundary: thin plumbing around the orchestrator. The envelope is
//! returned verbatim; only a missing code sample is a client error.

use crate::agents::AgentOrchestrator;
use crate::history::AnalysisStore;
use crate::types::{AnalysisEnvelope, AnalysisRecord};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AgentOrchestrator>,
    pub store: Arc<dyn AnalysisStore>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub code: Option<String>,
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/code/analyze", post(analyze))
        .route("/api/code/history", get(history))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("listening on http://{addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn analyze(State(state): State<AppState>, Json(request): Json<AnalyzeRequest>) -> Response {
    let Some(code) = request.code.filter(|code| !code.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Code is required" })),
        )
            .into_response();
    };

    let envelope = state.orchestrator.analyze_code(&code, &request.agents).await;

    // Fire-and-forget persistence; a store problem never fails the request.
    if let AnalysisEnvelope::Success { results, timestamp, .. } = &envelope {
        match serde_json::to_value(results) {
            Ok(results) => {
                let record = AnalysisRecord {
                    id: Uuid::new_v4(),
                    code,
                    results,
                    timestamp: *timestamp,
                    user_id: request.user_id,
                };
                if let Err(e) = state.store.record(record).await {
                    warn!("failed to persist analysis record: {e:#}");
                }
            }
            Err(e) => warn!("failed to serialize results for history: {e}"),
        }
    }

    Json(envelope).into_response()
}

async fn history() -> Json<serde_json::Value> {
    // Retrieval is not part of the analysis contract; the endpoint answers
    // with an empty set.
    Json(json!({
        "message": "Analysis history retrieved",
        "count": 0,
        "analyses": [],
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "Server running",
        "agents": state.orchestrator.agent_names(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;
    use crate::llm::interfaces::UnavailableClient;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            orchestrator: Arc::new(AgentOrchestrator::new(Arc::new(UnavailableClient))),
            store: Arc::new(MemoryStore::new(10)),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_analyze(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/code/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_code_is_a_client_error() {
        let response = router(test_state())
            .oneshot(post_analyze(json!({ "agents": ["all"] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Code is required");
    }

    #[tokio::test]
    async fn empty_code_is_a_client_error() {
        let response = router(test_state())
            .oneshot(post_analyze(json!({ "code": "" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyze_returns_envelope_verbatim() {
        let response = router(test_state())
            .oneshot(post_analyze(json!({
                "code": "var x = 1;",
                "agents": ["bugDetector"],
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["results"]["bugs"].is_object());
        assert!(body["results"].get("tests").is_none());
    }

    #[tokio::test]
    async fn successful_analysis_is_recorded() {
        let state = test_state();
        let store = state.store.clone();

        router(state)
            .oneshot(post_analyze(json!({
                "code": "let x = 1;",
                "userId": "user-42",
            })))
            .await
            .unwrap();

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].code, "let x = 1;");
        assert_eq!(recent[0].user_id.as_deref(), Some("user-42"));
    }

    #[tokio::test]
    async fn history_endpoint_is_an_empty_stub() {
        let response = router(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/code/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 0);
        assert!(body["analyses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_lists_all_agents() {
        let response = router(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "Server running");
        assert_eq!(
            body["agents"],
            json!(["BugDetector", "TestGenerator", "DocGenerator", "OptimizationAgent"])
        );
    }
}
