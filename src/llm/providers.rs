use super::interfaces::{CompletionClient, CompletionRequest, LlmError, UnavailableClient};
use crate::config::LlmConfig;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// OpenAI chat-completions provider.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_content},
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: serde_json::Value =
            serde_json::from_str(&text).map_err(|_| LlmError::EmptyCompletion)?;
        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        Ok(content)
    }
}

/// Ollama provider for local models.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        // Local models need more headroom than hosted APIs.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(300)))
            .build()?;

        Ok(Self {
            client,
            base_url,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let prompt = format!(
            "System: {}\n\nUser: {}\n",
            request.system_prompt, request.user_content
        );

        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "temperature": request.temperature,
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: serde_json::Value =
            serde_json::from_str(&text).map_err(|_| LlmError::EmptyCompletion)?;
        let content = data["response"].as_str().unwrap_or("").to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        Ok(content)
    }
}

/// Build the delegation client for the configured provider. Never fails:
/// a missing credential or an unknown provider substitutes
/// `UnavailableClient`, and agents run on their pattern-based paths.
pub fn client_from_config(config: &LlmConfig) -> Arc<dyn CompletionClient> {
    match config.provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = config
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());

            match api_key {
                Some(api_key) => match OpenAiClient::new(api_key, config) {
                    Ok(client) => {
                        info!(model = %config.model, "OpenAI delegation client configured");
                        Arc::new(client)
                    }
                    Err(e) => {
                        warn!("failed to build OpenAI client, using pattern-based analysis: {e}");
                        Arc::new(UnavailableClient)
                    }
                },
                None => {
                    warn!("OPENAI_API_KEY not set, using pattern-based analysis");
                    Arc::new(UnavailableClient)
                }
            }
        }
        "ollama" => match OllamaClient::new(config) {
            Ok(client) => {
                info!(model = %config.model, "Ollama delegation client configured");
                Arc::new(client)
            }
            Err(e) => {
                warn!("failed to build Ollama client, using pattern-based analysis: {e}");
                Arc::new(UnavailableClient)
            }
        },
        other => {
            warn!("unknown LLM provider '{other}', using pattern-based analysis");
            Arc::new(UnavailableClient)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_yields_unavailable_client() {
        let config = LlmConfig {
            provider: "acme".to_string(),
            ..LlmConfig::default()
        };
        let client = client_from_config(&config);
        assert_eq!(client.name(), "unavailable");
    }

    #[test]
    fn ollama_provider_needs_no_credential() {
        let config = LlmConfig {
            provider: "ollama".to_string(),
            ..LlmConfig::default()
        };
        let client = client_from_config(&config);
        assert_eq!(client.name(), "ollama");
    }
}
