use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Core types for the multi-agent code assistant

/// The four analysis capabilities the system exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    BugDetector,
    TestGenerator,
    DocGenerator,
    Optimization,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::BugDetector,
        AgentKind::TestGenerator,
        AgentKind::DocGenerator,
        AgentKind::Optimization,
    ];

    /// Wire identifier used in analysis requests.
    pub fn identifier(&self) -> &'static str {
        match self {
            AgentKind::BugDetector => "bugDetector",
            AgentKind::TestGenerator => "testGenerator",
            AgentKind::DocGenerator => "docGenerator",
            AgentKind::Optimization => "optimization",
        }
    }

    /// Human-readable name reported by the health endpoint.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::BugDetector => "BugDetector",
            AgentKind::TestGenerator => "TestGenerator",
            AgentKind::DocGenerator => "DocGenerator",
            AgentKind::Optimization => "OptimizationAgent",
        }
    }

    pub fn from_identifier(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.identifier() == id)
    }
}

/// Caller-requested subset of agents. `all` anywhere in the raw list wins;
/// unrecognized identifiers are dropped; an empty result degrades to All.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSelection {
    All,
    Subset(Vec<AgentKind>),
}

impl AgentSelection {
    pub fn normalize(raw: &[String]) -> Self {
        let mut kinds: Vec<AgentKind> = Vec::new();

        for id in raw {
            if id == "all" {
                return AgentSelection::All;
            }
            if let Some(kind) = AgentKind::from_identifier(id) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }

        if kinds.is_empty() {
            AgentSelection::All
        } else {
            AgentSelection::Subset(kinds)
        }
    }

    pub fn includes(&self, kind: AgentKind) -> bool {
        match self {
            AgentSelection::All => true,
            AgentSelection::Subset(kinds) => kinds.contains(&kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Bug analysis result. `count` is the number of findings discovered;
/// `issues` is truncated to the response bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugReport {
    pub agent: String,
    pub count: usize,
    pub issues: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub agent: String,
    pub count: usize,
    pub tests: Vec<String>,
    pub framework: String,
    pub coverage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocReport {
    pub agent: String,
    pub documentation: String,
    pub format: String,
    pub sections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationReport {
    pub agent: String,
    pub count: usize,
    pub suggestions: Vec<String>,
    pub potential_gain: String,
}

/// Result produced by one agent run, polymorphic over agent kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentReport {
    Bugs(BugReport),
    Tests(TestReport),
    Documentation(DocReport),
    Optimizations(OptimizationReport),
}

/// Aggregated results keyed by the envelope naming contract. The keys
/// (`bugs`, `tests`, `documentation`, `optimizations`) intentionally differ
/// from the agent identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bugs: Option<BugReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests: Option<TestReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<DocReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimizations: Option<OptimizationReport>,
}

impl AnalysisResults {
    pub fn insert(&mut self, report: AgentReport) {
        match report {
            AgentReport::Bugs(r) => self.bugs = Some(r),
            AgentReport::Tests(r) => self.tests = Some(r),
            AgentReport::Documentation(r) => self.documentation = Some(r),
            AgentReport::Optimizations(r) => self.optimizations = Some(r),
        }
    }
}

/// Unified response envelope. Failure discards partial results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisEnvelope {
    Success {
        success: bool,
        results: AnalysisResults,
        timestamp: DateTime<Utc>,
    },
    Failure {
        success: bool,
        error: String,
    },
}

impl AnalysisEnvelope {
    pub fn success(results: AnalysisResults) -> Self {
        AnalysisEnvelope::Success {
            success: true,
            results,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        AnalysisEnvelope::Failure {
            success: false,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisEnvelope::Success { .. })
    }
}

/// Shape handed to the persistence collaborator. The analysis core never
/// reads these back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub code: String,
    pub results: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
}
