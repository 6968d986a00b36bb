// src/ui/transport.rs
use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;

use crate::message::{ChatRequest, ReplyBody};

pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000/api/chat";

/// The call to the proxy never produced a readable reply.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to chat proxy failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chat proxy reply was not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid chat proxy url: {0}")]
    Url(String),
}

/// Status and body of a proxy reply, success or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl ProxyReply {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: ReplyBody { response: Some(response.into()), error: None },
        }
    }

    pub fn failed(status: u16, error: Option<String>) -> Self {
        Self { status, body: ReplyBody { response: None, error } }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &str) -> Result<ProxyReply, TransportError>;
}

/// Posts to the proxy's `/api/chat` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: Url,
}

impl HttpTransport {
    pub fn new(http: reqwest::Client, url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::Url(e.to_string()))?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, message: &str) -> Result<ProxyReply, TransportError> {
        let resp = self
            .http
            .post(self.url.clone())
            .json(&ChatRequest::new(message))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        let body: ReplyBody = serde_json::from_slice(&bytes)?;
        Ok(ProxyReply { status, body })
    }
}
