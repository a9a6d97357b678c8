use crate::agents::Agent;
use crate::llm::decode;
use crate::llm::interfaces::{CompletionClient, CompletionRequest, LlmError};
use crate::llm::prompts::AgentPrompts;
use crate::types::{AgentKind, AgentReport, BugReport, Severity};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Response size bound: the first findings in discovery order are kept.
pub const MAX_ISSUES: usize = 5;

const AGENT_NAME: &str = "BugDetector";

lazy_static! {
    static ref FUNCTION_DECL: Regex = Regex::new(r"function\s+\w+\s*\(").unwrap();
}

/// Flags bugs, anti-patterns and risky constructs in a code sample.
pub struct BugDetectorAgent {
    client: Arc<dyn CompletionClient>,
}

#[derive(Debug, Deserialize)]
struct BugPayload {
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    severity: Option<Severity>,
}

impl BugDetectorAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Analyze the sample for bugs. Never fails: any delegation problem
    /// degrades to the pattern-based path.
    #[instrument(skip(self, code), fields(code_len = code.len()))]
    pub async fn analyze(&self, code: &str) -> BugReport {
        match self.delegate(code).await {
            Ok(report) => report,
            Err(e) => {
                warn!("delegated bug analysis unavailable, using pattern-based path: {e}");
                self.pattern_analysis(code)
            }
        }
    }

    async fn delegate(&self, code: &str) -> Result<BugReport, LlmError> {
        let template = AgentPrompts::bug_detection();
        let content = self
            .client
            .complete(CompletionRequest {
                user_content: template.render_user(code),
                system_prompt: template.system_prompt,
                temperature: template.temperature,
                max_tokens: template.max_tokens,
            })
            .await?;

        let payload = decode::parse_json::<BugPayload>(&content).unwrap_or_else(|| {
            let bullets = decode::extract_bullets(&content);
            BugPayload {
                issues: if bullets.is_empty() {
                    vec![content.clone()]
                } else {
                    bullets
                },
                severity: None,
            }
        });

        let count = payload.issues.len();
        let mut issues = payload.issues;
        issues.truncate(MAX_ISSUES);

        Ok(BugReport {
            agent: AGENT_NAME.to_string(),
            count,
            issues,
            severity: payload.severity.unwrap_or(Severity::Medium),
        })
    }

    /// Deterministic line-oriented scan. Pure function of the text.
    fn pattern_analysis(&self, code: &str) -> BugReport {
        let mut issues = Vec::new();

        for (idx, line) in code.lines().enumerate() {
            let line_no = idx + 1;

            if line.contains("var ") {
                issues.push(format!(
                    "Line {line_no}: Use 'let' or 'const' instead of 'var'"
                ));
            }
            if line.contains("==") && !line.contains("===") {
                issues.push(format!(
                    "Line {line_no}: Use '===' for strict equality comparison"
                ));
            }
            if line.contains("setTimeout") && !line.contains("clearTimeout") {
                issues.push(format!(
                    "Line {line_no}: Potential memory leak - consider cleanup for setTimeout"
                ));
            }
            if line.contains("console.log") {
                issues.push(format!(
                    "Line {line_no}: Remove debug console.log in production"
                ));
            }
            if FUNCTION_DECL.is_match(line) {
                issues.push(format!(
                    "Line {line_no}: Consider using arrow functions for consistency"
                ));
            }
        }

        if issues.is_empty() {
            issues = vec![
                "Missing error handling in async operations".to_string(),
                "Consider input validation for user data".to_string(),
                "Add type definitions for better type safety".to_string(),
                "Review variable naming conventions".to_string(),
            ];
        }

        let count = issues.len();
        issues.truncate(MAX_ISSUES);

        BugReport {
            agent: AGENT_NAME.to_string(),
            count,
            issues,
            severity: Severity::Medium,
        }
    }
}

#[async_trait]
impl Agent for BugDetectorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::BugDetector
    }

    async fn run(&self, code: &str) -> AgentReport {
        AgentReport::Bugs(self.analyze(code).await)
    }
}
