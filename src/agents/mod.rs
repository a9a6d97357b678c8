pub mod bug_detector;
pub mod doc_generator;
pub mod optimization;
pub mod orchestrator;
pub mod test_generator;

pub use bug_detector::BugDetectorAgent;
pub use doc_generator::DocGeneratorAgent;
pub use optimization::OptimizationAgent;
pub use orchestrator::AgentOrchestrator;
pub use test_generator::TestGeneratorAgent;

use crate::types::{AgentKind, AgentReport};
use async_trait::async_trait;

/// Contract every analysis agent satisfies. `run` never fails: a delegation
/// problem degrades to the agent's pattern-based path internally, so the
/// caller always receives a well-formed report.
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    async fn run(&self, code: &str) -> AgentReport;
}
