//! External completion contract and its OpenRouter-compatible client
//!
//! The classifier only depends on [`CompletionService`]; the HTTP client is one
//! implementation of it.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model for classification
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// A single classification request to the external model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_message: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Opaque text completion: request in, raw text out
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Extra headers to include in requests (e.g., X-Title, HTTP-Referer)
    pub extra_headers: Vec<(String, String)>,
}

impl ProviderConfig {
    pub fn openrouter(api_key: String, model: impl Into<String>) -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key,
            model: model.into(),
            extra_headers: vec![("X-Title".to_string(), "Moderation AI".to_string())],
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat-completions client for OpenRouter and other OpenAI-compatible APIs
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Arc<Client>,
    provider: ProviderConfig,
}

impl OpenRouterClient {
    pub fn with_provider(provider: ProviderConfig) -> Self {
        Self {
            client: Arc::new(Client::new()),
            provider,
        }
    }

    /// Build a client from the loaded configuration and the stored API key
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let api_key = crate::keyring::get_api_key()?;
        let provider = ProviderConfig::openrouter(api_key, config.llm.model.clone())
            .with_base_url(config.llm.base_url.clone());
        Ok(Self::with_provider(provider))
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }
}

#[async_trait]
impl CompletionService for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.provider.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut req_builder = self
            .client
            .post(format!("{}/chat/completions", self.provider.base_url))
            .bearer_auth(&self.provider.api_key);
        for (key, value) in &self.provider.extra_headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        let response = req_builder
            .json(&body)
            .send()
            .await
            .context("Failed to send request to LLM provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("LLM API error ({}): {}", status, body);
        }

        let body = response.text().await.context("Failed to read response body")?;
        let raw: Value = serde_json::from_str(body.trim()).context("Failed to parse JSON response")?;

        extract_content(&raw).ok_or_else(|| anyhow::anyhow!("No message content in response"))
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response.
/// Some models return a plain string, others an array of text parts.
fn extract_content(raw: &Value) -> Option<String> {
    let content = raw
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))?;

    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => {
            let text: Vec<&str> = parts
                .iter()
                .filter(|part| part.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect();
            if text.is_empty() {
                None
            } else {
                Some(text.join(""))
            }
        }
        _ => None,
    }
}
