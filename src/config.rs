/// Configuration management for the code assistant
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerSettings,
    pub llm: LlmConfig,
    pub history: HistorySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: "openai" or "ollama".
    pub provider: String,
    /// API credential; falls back to OPENAI_API_KEY at client construction.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySettings {
    pub enabled: bool,
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            llm: LlmConfig::default(),
            history: HistorySettings {
                enabled: true,
                capacity: 1000,
            },
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: None,
            base_url: None,
            model: "gpt-3.5-turbo".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Apply environment variable overrides on top of the current values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port.parse()?;
        }

        if let Ok(host) = std::env::var("CODE_ASSISTANT_HOST") {
            self.server.host = host;
        }

        if let Ok(provider) = std::env::var("CODE_ASSISTANT_LLM_PROVIDER") {
            self.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("CODE_ASSISTANT_LLM_MODEL") {
            self.llm.model = model;
        }

        if let Ok(base_url) = std::env::var("CODE_ASSISTANT_LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = Some(api_key);
        }

        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be greater than 0"));
        }

        if !matches!(self.llm.provider.as_str(), "openai" | "ollama") {
            return Err(anyhow::anyhow!(
                "Unknown LLM provider: {}",
                self.llm.provider
            ));
        }

        if self.llm.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("LLM timeout must be greater than 0"));
        }

        if self.history.enabled && self.history.capacity == 0 {
            return Err(anyhow::anyhow!(
                "History capacity must be greater than 0 when history is enabled"
            ));
        }

        Ok(())
    }
}
