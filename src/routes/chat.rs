use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    state::SharedState,
};

pub const MISSING_MESSAGE: &str = "Message content is required";

#[tracing::instrument(name = "chat", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::Internal(rejection.body_text()))?;

    // Only a missing or empty field is rejected; the text is forwarded as sent.
    let message = payload.message.as_deref().unwrap_or_default();
    if message.is_empty() {
        debug!("rejecting chat request without message");
        return Err(AppError::BadRequest(MISSING_MESSAGE.to_string()));
    }

    let completion = state.completion.complete(message).await?;
    let response = completion.reply_or_fallback();

    info!(prompt_len = message.len(), reply_len = response.len(), "chat completed");
    Ok(Json(ChatResponse { response }))
}
