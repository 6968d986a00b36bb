// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorResponse;

/// Text returned to the caller for every 500.
pub const GENERIC_ERROR: &str = "An error occurred while processing your request";

/// Failure talking to the model service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to model service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed model service payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid model service url: {0}")]
    Url(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::BadRequest(msg) => msg,
            other => {
                tracing::error!(error = %other, "Error in chatbot");
                GENERIC_ERROR.to_string()
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
