pub mod decode;
pub mod interfaces;
pub mod prompts;
pub mod providers;

pub use interfaces::{CompletionClient, CompletionRequest, LlmError, UnavailableClient};
pub use prompts::{AgentPrompts, PromptTemplate};
pub use providers::client_from_config;
