//! Completion (LLM) service abstraction
//!
//! A single "complete text given prompt" operation behind a trait, so the
//! answer pipeline can be tested against scripted fakes and the vendor
//! integration stays in one place. Rate limiting is surfaced as its own
//! error variant; the pipeline recovers it locally instead of failing.

use crate::config::CompletionConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Options for a single completion request
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Sampling temperature; low values bias toward extraction-style answers
    pub temperature: f32,

    /// Output token cap
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 300,
        }
    }
}

impl CompletionOptions {
    pub fn from_config(config: &CompletionConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Trait for text completion
#[async_trait]
pub trait Completer: Send + Sync {
    /// Generate a completion for the prompt.
    ///
    /// Returns `AppError::RateLimited` when the service throttles the
    /// request and `AppError::Completion` for transport-level failures;
    /// no retries are attempted here.
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat-completion client
#[derive(Debug)]
pub struct OpenAiCompleter {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

impl OpenAiCompleter {
    /// Create a new completer from configuration
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "completion api_key is required for the openai provider".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        })
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Completion {
                message: format!("request failed: {}", e),
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Completion {
                message: format!("API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(|e| AppError::Completion {
                message: format!("failed to parse response: {}", e),
            })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Completion {
                message: "empty response".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Completer returning fixed canned text, for development and testing
pub struct StaticCompleter {
    text: String,
}

impl StaticCompleter {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Completer for StaticCompleter {
    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<String> {
        Ok(self.text.clone())
    }

    fn model_name(&self) -> &str {
        "static-completion"
    }
}

/// Create a completer based on configuration
pub fn create_completer(config: &CompletionConfig) -> Result<Arc<dyn Completer>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiCompleter::new(config)?)),
        "static" => Ok(Arc::new(StaticCompleter::new(
            "Static completion (no completion provider configured).",
        ))),
        other => {
            tracing::warn!(provider = other, "Unknown completion provider, using static");
            Ok(Arc::new(StaticCompleter::new(
                "Static completion (no completion provider configured).",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_completer() {
        let completer = StaticCompleter::new("canned answer");
        let options = CompletionOptions::default();
        let text = completer.complete("anything", &options).await.unwrap();
        assert_eq!(text, "canned answer");
    }

    #[test]
    fn test_default_options() {
        let options = CompletionOptions::default();
        assert!((options.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(options.max_tokens, 300);
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = CompletionConfig::default();
        let err = OpenAiCompleter::new(&config).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
