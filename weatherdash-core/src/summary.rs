//! Plain-language summaries of the current conditions.
//!
//! [`SummaryGenerator`] builds the prompt and talks to any [`ChatCompletion`]
//! backend; [`OpenAiChatClient`] is the OpenAI-compatible HTTP one.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::{config::LlmConfig, model::WeatherReading};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Why a summary could not be produced.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("No API key configured for the language model. Set OPENAI_API_KEY or run `weatherdash configure`.")]
    MissingApiKey,

    #[error("Language model rejected the API key: {0}")]
    Unauthorized(String),

    #[error("Failed to reach the language model: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Language model request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected language model response: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Language model returned no choices")]
    EmptyReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a `/chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// A backend that answers a chat request with the first choice's content.
#[async_trait]
pub trait ChatCompletion: Send + Sync + Debug {
    async fn complete(&self, request: &ChatRequest) -> Result<String, SummaryError>;
}

/// OpenAI-compatible chat-completion client.
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenAiChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, SummaryError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SummaryError::Transport)?;

        Ok(Self {
            api_key: config.api_key.trim().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull `error.message` out of an OpenAI error body, or fall back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl ChatCompletion for OpenAiChatClient {
    #[instrument(skip_all, fields(model = %request.model))]
    async fn complete(&self, request: &ChatRequest) -> Result<String, SummaryError> {
        if self.api_key.is_empty() {
            return Err(SummaryError::MissingApiKey);
        }

        let url = format!("{}/chat/completions", self.base_url);

        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(SummaryError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(SummaryError::Transport)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(SummaryError::Unauthorized(api_error_message(&body)));
        }
        if !status.is_success() {
            return Err(SummaryError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(SummaryError::Malformed)?;

        debug!(choices = parsed.choices.len(), "chat completion received");

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or(SummaryError::EmptyReply)
    }
}

/// The user prompt describing the current conditions.
pub fn build_prompt(reading: &WeatherReading) -> String {
    format!(
        "The current weather in your city is {} with a temperature of {:.1}°C. \
         Explain this in a simple way for a general audience.",
        reading.description,
        reading.temperature_c(),
    )
}

/// Turns a [`WeatherReading`] into a short explanation via a chat model.
#[derive(Debug, Clone)]
pub struct SummaryGenerator {
    chat: Arc<dyn ChatCompletion>,
    model: String,
    max_tokens: u32,
}

impl SummaryGenerator {
    pub fn new(chat: Arc<dyn ChatCompletion>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            chat,
            model: model.into(),
            max_tokens,
        }
    }

    /// Generator backed by [`OpenAiChatClient`].
    pub fn from_config(config: &LlmConfig) -> Result<Self, SummaryError> {
        let client = OpenAiChatClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.model.clone(), config.max_tokens))
    }

    pub fn request_for(&self, reading: &WeatherReading) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(reading)),
            ],
            max_tokens: self.max_tokens,
        }
    }

    pub async fn generate(&self, reading: &WeatherReading) -> Result<String, SummaryError> {
        let request = self.request_for(reading);
        let reply = self.chat.complete(&request).await?;
        Ok(reply.trim().to_string())
    }

    /// Like [`generate`](Self::generate), but never fails.
    pub async fn summarize(&self, reading: &WeatherReading) -> SummaryOutcome {
        let outcome = SummaryOutcome::from(self.generate(reading).await);
        if let SummaryOutcome::Failed { reason } = &outcome {
            warn!(%reason, "summary generation failed");
        }
        outcome
    }
}

/// A summary ready for display: the model's text or the failure reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryOutcome {
    Generated { text: String },
    Failed { reason: String },
}

impl SummaryOutcome {
    /// What the page shows: the reply, or the error text in its place.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Generated { text } => text,
            Self::Failed { reason } => reason,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }
}

impl From<Result<String, SummaryError>> for SummaryOutcome {
    fn from(result: Result<String, SummaryError>) -> Self {
        match result {
            Ok(text) => Self::Generated { text },
            Err(e) => Self::Failed {
                reason: e.to_string(),
            },
        }
    }
}
