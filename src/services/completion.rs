// src/services/completion.rs
use async_trait::async_trait;
use reqwest::{Url, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

/// Model every completion is requested from.
pub const MODEL: &str = "llama3-8b-8192";

/// Reply text used when the model service answers without any content.
pub const NO_RESPONSE_FALLBACK: &str = "No response from the bot";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Turn>,
}

/// The subset of an OpenAI-style completion payload we read.
///
/// `choices` is required: a payload without it is malformed. Everything below
/// it may be missing or null, which is answered with the fallback text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Option<Choice>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Response carrying a single choice with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![Some(Choice {
                message: Some(ChoiceMessage { content: Some(text.into()) }),
            })],
        }
    }

    /// Text of the first choice, or which part of the payload was missing.
    pub fn first_text(&self) -> Result<&str, &'static str> {
        let choice = self.choices.first().ok_or("choices")?;
        let choice = choice.as_ref().ok_or("choices[0]")?;
        let message = choice.message.as_ref().ok_or("choices[0].message")?;
        match message.content.as_deref() {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err("choices[0].message.content"),
        }
    }

    /// First choice text, falling back to [`NO_RESPONSE_FALLBACK`].
    ///
    /// The fallback is logged so a change in the payload shape shows up in
    /// the server log even though the caller still gets a 200.
    pub fn reply_or_fallback(&self) -> String {
        match self.first_text() {
            Ok(text) => text.to_string(),
            Err(missing) => {
                tracing::warn!(missing, "model service reply had no text, using fallback");
                NO_RESPONSE_FALLBACK.to_string()
            }
        }
    }
}

/// Single-turn completion against the model service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, UpstreamError>;
}

/// Groq's OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: Url,
    model: String,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GroqClient {
    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        api_base: &str,
    ) -> Result<Self, UpstreamError> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let base = if api_base.ends_with('/') {
            api_base.to_string()
        } else {
            format!("{api_base}/")
        };
        let endpoint = Url::parse(&base)
            .and_then(|u| u.join("chat/completions"))
            .map_err(|e| UpstreamError::Url(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint,
            model: MODEL.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, UpstreamError> {
        let body = CompletionRequest {
            model: self.model.clone(),
            messages: vec![Turn::user(prompt)],
        };

        tracing::debug!(model = %self.model, "sending completion request");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
