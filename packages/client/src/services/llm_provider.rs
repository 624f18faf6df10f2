use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("LLM not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty response")]
    EmptyChoices,
    #[error("no response within {0} ms")]
    Timeout(u64),
    #[error("model reported: {0}")]
    Upstream(String),
}

impl LLMError {
    /// 503 / "Service Unavailable" / "overloaded": worth one delayed retry.
    pub fn is_overloaded(&self) -> bool {
        match self {
            LLMError::HttpStatus { status, body } => {
                *status == reqwest::StatusCode::SERVICE_UNAVAILABLE || mentions_overload(body)
            }
            LLMError::Upstream(message) => mentions_overload(message),
            _ => false,
        }
    }
}

fn mentions_overload(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("503") || lower.contains("service unavailable") || lower.contains("overloaded")
}

/// A remote text-completion model.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Whether credentials are present; unavailable models are never called.
    fn is_available(&self) -> bool;

    async fn complete(&self, system: &str, user: &str) -> Result<String, LLMError>;
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct LLMProvider {
    settings: LlmSettings,
    client: reqwest::Client,
}

impl LLMProvider {
    pub fn new(settings: LlmSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { settings, client }
    }

    pub fn from_env() -> Self {
        Self::new(LlmSettings::from_env())
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatResponse, LLMError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(LLMError::NotConfigured("LLM_API_KEY"))?;

        let url = format!("{}/chat/completions", self.settings.api_endpoint.trim_end_matches('/'));
        let payload = serde_json::json!({
            "model": self.settings.model,
            "messages": messages,
            "temperature": self.settings.temperature,
            "stream": false
        });

        let resp = self.client.post(&url).bearer_auth(api_key).json(&payload).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LLMError::HttpStatus { status, body });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %String::from_utf8_lossy(&bytes),
                "failed to parse LLM response JSON"
            );
            LLMError::Json(e)
        })
    }
}

#[async_trait]
impl TextModel for LLMProvider {
    fn is_available(&self) -> bool {
        self.settings.api_key.as_deref().is_some_and(|v| !v.trim().is_empty())
            && !self.settings.model.trim().is_empty()
            && !self.settings.api_endpoint.trim().is_empty()
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LLMError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        let response = self.chat(&messages).await?;
        response
            .first_content()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
            .ok_or(LLMError::EmptyChoices)
    }
}
