use crate::agents::{
    Agent, BugDetectorAgent, DocGeneratorAgent, OptimizationAgent, TestGeneratorAgent,
};
use crate::llm::interfaces::CompletionClient;
use crate::types::{AgentSelection, AnalysisEnvelope, AnalysisResults};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Owns one instance of each analysis agent, dispatches a code sample to the
/// selected subset and assembles the unified envelope.
pub struct AgentOrchestrator {
    agents: Vec<Arc<dyn Agent>>,
}

impl AgentOrchestrator {
    /// Create the orchestrator with all four agents sharing one delegation
    /// client handle. The handle is never mutated after construction.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        let agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(BugDetectorAgent::new(client.clone())),
            Arc::new(TestGeneratorAgent::new(client.clone())),
            Arc::new(DocGeneratorAgent::new(client.clone())),
            Arc::new(OptimizationAgent::new(client)),
        ];

        Self { agents }
    }

    /// Run the selected agents over the sample and merge their reports.
    /// Agent-internal failures are absorbed by each agent's fallback policy;
    /// anything that still escapes converts the whole call into a failure
    /// envelope with no partial results.
    #[instrument(skip(self, code), fields(code_len = code.len()))]
    pub async fn analyze_code(&self, code: &str, selected: &[String]) -> AnalysisEnvelope {
        let selection = AgentSelection::normalize(selected);
        info!("analyzing code with selection {:?}", selection);

        match self.run_selected(code, &selection).await {
            Ok(results) => AnalysisEnvelope::success(results),
            Err(e) => {
                error!("orchestration failed: {e:#}");
                AnalysisEnvelope::failure(e.to_string())
            }
        }
    }

    async fn run_selected(
        &self,
        code: &str,
        selection: &AgentSelection,
    ) -> Result<AnalysisResults> {
        let mut results = AnalysisResults::default();

        for agent in &self.agents {
            let kind = agent.kind();
            if !selection.includes(kind) {
                continue;
            }

            // Each agent runs in its own task so a panic surfaces here as a
            // failure envelope instead of tearing down the request.
            let agent = agent.clone();
            let sample = code.to_string();
            let report = tokio::spawn(async move { agent.run(&sample).await })
                .await
                .with_context(|| format!("{} agent failed unexpectedly", kind.display_name()))?;

            results.insert(report);
        }

        Ok(results)
    }

    /// Display names of all registered agents, for the health surface.
    pub fn agent_names(&self) -> Vec<&'static str> {
        self.agents.iter().map(|a| a.kind().display_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::interfaces::UnavailableClient;
    use crate::types::{AgentKind, AgentReport};
    use async_trait::async_trait;

    fn orchestrator() -> AgentOrchestrator {
        AgentOrchestrator::new(Arc::new(UnavailableClient))
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_selection_runs_all_agents() {
        let envelope = orchestrator().analyze_code("const x = 1;", &[]).await;

        let AnalysisEnvelope::Success { results, .. } = envelope else {
            panic!("expected success envelope");
        };
        assert!(results.bugs.is_some());
        assert!(results.tests.is_some());
        assert!(results.documentation.is_some());
        assert!(results.optimizations.is_some());
    }

    #[tokio::test]
    async fn empty_selection_matches_explicit_all() {
        let orchestrator = orchestrator();
        let code = "function f() { return 1; }";

        let implicit = orchestrator.analyze_code(code, &[]).await;
        let explicit = orchestrator.analyze_code(code, &ids(&["all"])).await;

        let (AnalysisEnvelope::Success { results: a, .. }, AnalysisEnvelope::Success { results: b, .. }) =
            (implicit, explicit)
        else {
            panic!("expected success envelopes");
        };
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn subset_selection_yields_only_that_key() {
        let envelope = orchestrator()
            .analyze_code("var x = 1;", &ids(&["bugDetector"]))
            .await;

        let value = serde_json::to_value(envelope).unwrap();
        assert_eq!(value["success"], true);

        let results = value["results"].as_object().unwrap();
        assert_eq!(results.keys().collect::<Vec<_>>(), vec!["bugs"]);
    }

    #[tokio::test]
    async fn results_use_envelope_keys_not_agent_identifiers() {
        let envelope = orchestrator()
            .analyze_code("var x = 1;", &ids(&["testGenerator", "optimization"]))
            .await;

        let value = serde_json::to_value(envelope).unwrap();
        let results = value["results"].as_object().unwrap();
        assert!(results.contains_key("tests"));
        assert!(results.contains_key("optimizations"));
        assert!(!results.contains_key("testGenerator"));
        assert!(!results.contains_key("optimization"));
    }

    #[tokio::test]
    async fn every_report_is_non_empty_for_empty_input() {
        let envelope = orchestrator().analyze_code("", &[]).await;

        let AnalysisEnvelope::Success { results, .. } = envelope else {
            panic!("expected success envelope");
        };
        assert!(!results.bugs.unwrap().issues.is_empty());
        assert!(!results.tests.unwrap().tests.is_empty());
        assert!(!results.documentation.unwrap().documentation.is_empty());
        assert!(!results.optimizations.unwrap().suggestions.is_empty());
    }

    struct PanickingAgent;

    #[async_trait]
    impl Agent for PanickingAgent {
        fn kind(&self) -> AgentKind {
            AgentKind::BugDetector
        }

        async fn run(&self, _code: &str) -> AgentReport {
            panic!("agent blew up");
        }
    }

    #[tokio::test]
    async fn agent_panic_becomes_failure_envelope() {
        let orchestrator = AgentOrchestrator {
            agents: vec![Arc::new(PanickingAgent)],
        };

        let envelope = orchestrator.analyze_code("code", &[]).await;
        let AnalysisEnvelope::Failure { success, error } = envelope else {
            panic!("expected failure envelope");
        };
        assert!(!success);
        assert!(error.contains("BugDetector"));
    }

    #[tokio::test]
    async fn agent_names_cover_all_four() {
        assert_eq!(
            orchestrator().agent_names(),
            vec![
                "BugDetector",
                "TestGenerator",
                "DocGenerator",
                "OptimizationAgent"
            ]
        );
    }
}
