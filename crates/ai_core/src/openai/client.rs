//! OpenAI-compatible chat-completions client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{ChatEngine, ChatRequest, ChatResponse, TokenUsage, ToolDefinition};

use super::wire::{IncomingMessage, OutgoingMessage, to_wire_messages};

/// Chat engine backed by an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiCompatibleEngine {
    client: Client,
    config: InferenceConfig,
}

impl std::fmt::Debug for OpenAiCompatibleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleEngine")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.default_model)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleEngine {
    /// Create a new engine; fails when no API key is configured
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        if !config.has_api_key() {
            return Err(InferenceError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized chat engine"
        );

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn resolve_model<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model)
    }

    fn map_send_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout(self.config.timeout_ms)
        } else {
            InferenceError::from(err.without_url())
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OutgoingMessage>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolDefinition],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: IncomingMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[async_trait]
impl ChatEngine for OpenAiCompatibleEngine {
    #[instrument(skip(self, request), fields(model = %self.resolve_model(&request), turns = request.turns.len()))]
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, InferenceError> {
        let body = CompletionRequest {
            model: self.resolve_model(&request),
            messages: to_wire_messages(&request.turns),
            tools: &request.tools,
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
        };

        debug!(tools = request.tools.len(), "Sending chat completion request");

        let mut builder = self.client.post(self.completions_url()).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Chat completion request failed");
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => InferenceError::RateLimited,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    InferenceError::Unauthorized(format!("Status {status}: {body}"))
                },
                _ => InferenceError::ServerError(format!("Status {status}: {body}")),
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.without_url().to_string()))?;

        let Some(choice) = completion.choices.into_iter().next() else {
            return Err(InferenceError::InvalidResponse(
                "response contained no choices".to_string(),
            ));
        };

        let (content, tool_calls) = choice.message.into_parts()?;

        debug!(
            tokens = ?completion.usage,
            tool_calls = tool_calls.len(),
            finish_reason = ?choice.finish_reason,
            "Chat completion finished"
        );

        Ok(ChatResponse {
            content,
            tool_calls,
            model: completion.model,
            usage: completion.usage,
            finish_reason: choice.finish_reason,
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
