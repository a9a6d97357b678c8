use crate::agents::Agent;
use crate::llm::decode;
use crate::llm::interfaces::{CompletionClient, CompletionRequest, LlmError};
use crate::llm::prompts::AgentPrompts;
use crate::types::{AgentKind, AgentReport, TestReport};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{instrument, warn};

pub const MAX_TESTS: usize = 4;

const AGENT_NAME: &str = "TestGenerator";
const FRAMEWORK: &str = "Jest";
const HEURISTIC_COVERAGE: &str = "~60%";
const RECOVERED_COVERAGE: &str = "~70%";

/// Generates unit tests for a code sample.
pub struct TestGeneratorAgent {
    client: Arc<dyn CompletionClient>,
}

#[derive(Debug, Deserialize)]
struct TestPayload {
    #[serde(default)]
    tests: Vec<String>,
    #[serde(default)]
    coverage: Option<String>,
}

impl TestGeneratorAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Generate tests for the sample. Never fails: any delegation problem
    /// degrades to the pattern-based path.
    #[instrument(skip(self, code), fields(code_len = code.len()))]
    pub async fn generate(&self, code: &str) -> TestReport {
        match self.delegate(code).await {
            Ok(report) => report,
            Err(e) => {
                warn!("delegated test generation unavailable, using pattern-based path: {e}");
                self.pattern_generation(code)
            }
        }
    }

    async fn delegate(&self, code: &str) -> Result<TestReport, LlmError> {
        let template = AgentPrompts::test_generation();
        let content = self
            .client
            .complete(CompletionRequest {
                user_content: template.render_user(code),
                system_prompt: template.system_prompt,
                temperature: template.temperature,
                max_tokens: template.max_tokens,
            })
            .await?;

        let payload = decode::parse_json::<TestPayload>(&content).unwrap_or_else(|| {
            let blocks = decode::extract_fenced_blocks(&content);
            TestPayload {
                tests: if blocks.is_empty() {
                    vec![content.clone()]
                } else {
                    blocks
                },
                coverage: Some(RECOVERED_COVERAGE.to_string()),
            }
        });

        let count = payload.tests.len();
        let mut tests = payload.tests;
        tests.truncate(MAX_TESTS);

        Ok(TestReport {
            agent: AGENT_NAME.to_string(),
            count,
            tests,
            framework: FRAMEWORK.to_string(),
            coverage: payload
                .coverage
                .unwrap_or_else(|| HEURISTIC_COVERAGE.to_string()),
        })
    }

    /// Presence-based test synthesis. Pure function of the text.
    fn pattern_generation(&self, code: &str) -> TestReport {
        let mut tests = Vec::new();

        if code.contains("function") || code.contains("=>") {
            tests.push(
                "describe(\"Function Tests\", () => { it(\"should return expected result\", () => { expect(func()).toBeDefined(); }); });"
                    .to_string(),
            );
            tests.push(
                "describe(\"Edge Cases\", () => { it(\"should handle null input\", () => { expect(func(null)).not.toThrow(); }); });"
                    .to_string(),
            );
        }

        if code.contains("async") || code.contains("await") {
            tests.push(
                "it(\"should resolve async operation\", async () => { const result = await asyncFunc(); expect(result).toBeDefined(); });"
                    .to_string(),
            );
            tests.push(
                "it(\"should handle async errors\", async () => { await expect(asyncFunc()).rejects.toThrow(); });"
                    .to_string(),
            );
        }

        if code.contains("class") {
            tests.push(
                "describe(\"Class Tests\", () => { it(\"should instantiate correctly\", () => { const instance = new MyClass(); expect(instance).toBeDefined(); }); });"
                    .to_string(),
            );
        }

        if tests.is_empty() {
            tests.push(
                "it(\"should pass basic test\", () => { expect(true).toBe(true); });".to_string(),
            );
            tests.push(
                "it(\"should handle input validation\", () => { expect(() => validator(null)).not.toThrow(); });"
                    .to_string(),
            );
        }

        let count = tests.len();
        tests.truncate(MAX_TESTS);

        TestReport {
            agent: AGENT_NAME.to_string(),
            count,
            tests,
            framework: FRAMEWORK.to_string(),
            coverage: HEURISTIC_COVERAGE.to_string(),
        }
    }
}

#[async_trait]
impl Agent for TestGeneratorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::TestGenerator
    }

    async fn run(&self, code: &str) -> AgentReport {
        AgentReport::Tests(self.generate(code).await)
    }
}
