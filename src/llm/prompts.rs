/// Role-specific prompt template for one agent.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub system_prompt: String,
    pub user_template: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl PromptTemplate {
    pub fn render_user(&self, code: &str) -> String {
        self.user_template.replace("{code}", code)
    }
}

/// Collection of prompts for all agents.
pub struct AgentPrompts;

impl AgentPrompts {
    pub fn bug_detection() -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are an expert code reviewer. Analyze the provided code for bugs, anti-patterns, and potential issues.
Return a JSON object with the following structure: { "issues": ["issue 1", "issue 2", ...], "severity": "low|medium|high" }
List up to 5 critical issues. Be specific about what's wrong and where."#
                .to_string(),
            user_template: "Analyze this code for bugs:\n\n{code}".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }

    pub fn test_generation() -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are an expert test writer. Generate comprehensive Jest unit tests for the provided code.
Return a JSON object with: { "tests": ["test code 1", "test code 2", ...], "coverage": "XX%" }
Generate 3-4 tests covering normal cases, edge cases, and error handling.
Make tests production-ready and follow Jest conventions."#
                .to_string(),
            user_template: "Generate Jest tests for this code:\n\n{code}".to_string(),
            temperature: 0.7,
            max_tokens: 800,
        }
    }

    pub fn documentation() -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are an expert technical writer. Generate comprehensive Markdown documentation for the provided code.
Include: Overview, Functions/Methods, Parameters, Return values, Usage Examples, Error Handling, and Performance Notes.
Make it professional, clear, and ready for production documentation.
Return only the Markdown content, no JSON."#
                .to_string(),
            user_template: "Generate professional documentation for this code:\n\n{code}".to_string(),
            temperature: 0.5,
            max_tokens: 1000,
        }
    }

    pub fn optimization() -> PromptTemplate {
        PromptTemplate {
            system_prompt: r#"You are an expert performance engineer. Analyze the provided code for optimization opportunities.
Return a JSON object with: { "suggestions": ["optimization 1", "optimization 2", ...], "potentialGain": "XX% improvement" }
Focus on: algorithmic improvements, memory efficiency, code reusability, and modern patterns.
List up to 5 actionable suggestions with specific techniques."#
                .to_string(),
            user_template: "Analyze this code for performance optimizations:\n\n{code}".to_string(),
            temperature: 0.7,
            max_tokens: 600,
        }
    }
}
