use std::sync::Arc;

use axum::{extract::State, Json};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{ChatRequest, ChatResponse},
    services::providers::{chat::DEFAULT_TEMPERATURE, stylist_messages},
};

/// POST /chat/outfit-chat
pub async fn outfit_chat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let provider = state
        .chat
        .as_ref()
        .ok_or_else(|| AppError::Internal("Chat service is not configured".to_string()))?;

    if request.message.trim().is_empty() {
        return Err(AppError::InvalidInput("Message cannot be empty".to_string()));
    }

    let messages = stylist_messages(&request.message, request.context.as_ref());
    let temperature = request.temperature.unwrap_or(DEFAULT_TEMPERATURE);
    let response = provider.complete(&messages, temperature).await?;

    tracing::info!(user_id = %user.user_id(), provider = provider.name(), "Chat answered");

    Ok(Json(ChatResponse {
        response,
        image_urls: None,
        result: true,
        message: "Response generated".to_string(),
    }))
}
