use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Errors surfaced by delegation clients. None of these are fatal to an
/// agent: every variant is a signal to fall back to the pattern-based path.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("no delegation client configured")]
    Unavailable,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("provider returned an empty completion")]
    EmptyCompletion,
}

/// One completion call: a role-specific instruction plus user content.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_content: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Delegation seam between agents and an external language model. The
/// capability is either present (a real provider) or absent
/// (`UnavailableClient`); call sites never branch on nullability.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return generated text for the request. Any error degrades the caller
    /// to its heuristic path.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Stand-in used when no API credential is configured.
pub struct UnavailableClient;

#[async_trait]
impl CompletionClient for UnavailableClient {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::Unavailable)
    }
}
