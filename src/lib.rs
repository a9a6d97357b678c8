pub mod agents;
pub mod config;
pub mod history;
pub mod llm;
pub mod server;
pub mod types;
