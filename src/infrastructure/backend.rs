//! # Model Backend Client
//!
//! HTTP client for an Anthropic-style messages API. The session hands it
//! the ordered conversation; it returns the next assistant turn as one
//! text blob. This is the only suspension point in the pipeline.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackendConfig;
use crate::domain::traits::ModelBackend;
use crate::domain::types::{ChatMessage, MessageRole};
use crate::prompts;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{kind}: {message}")]
    Api { kind: String, message: String },
    #[error("no api key configured (set backend.api_key or {env})")]
    MissingApiKey { env: String },
    #[error("response contained no text content")]
    EmptyCompletion,
}

/// HTTP client reused across requests
fn http_client() -> &'static Client {
    use std::sync::OnceLock;
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client")
    })
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [WireMessage<'a>],
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

pub struct AnthropicBackend {
    config: BackendConfig,
}

impl AnthropicBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        let api_key = self
            .config
            .resolve_api_key()
            .ok_or_else(|| BackendError::MissingApiKey {
                env: self.config.api_key_env.clone(),
            })?;
        let url = format!("{}/v1/messages", self.config.endpoint.trim_end_matches('/'));

        let wire: Vec<WireMessage> = messages
            .iter()
            .map(|m| WireMessage {
                role: match m.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                },
                content: &m.content,
            })
            .collect();

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: prompts::SYSTEM_PROMPT,
            messages: &wire,
        };

        let response = http_client()
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error response".to_string());
            // Pull the structured error out of the body when there is one.
            if let Ok(error_json) = serde_json::from_str::<serde_json::Value>(&error_text) {
                if let Some(error) = error_json.get("error") {
                    if let (Some(kind), Some(message)) = (
                        error.get("type").and_then(|v| v.as_str()),
                        error.get("message").and_then(|v| v.as_str()),
                    ) {
                        return Err(BackendError::Api {
                            kind: kind.to_string(),
                            message: message.to_string(),
                        });
                    }
                }
            }
            return Err(BackendError::Api {
                kind: format!("http {status}"),
                message: error_text,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.content_type == "text")
            .map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(BackendError::EmptyCompletion);
        }
        Ok(text)
    }
}

#[async_trait]
impl ModelBackend for AnthropicBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        tracing::debug!(turns = messages.len(), "requesting completion");
        Ok(self.send(messages).await?)
    }
}
