//! Chat HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/chat/new       - Relay a message and return the updated conversation
//! - GET    /api/v1/chat/all-chats - Return the stored conversation
//! - DELETE /api/v1/chat/delete    - Clear the stored conversation

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use parley_types::chat::Message;

use crate::http::error::{AppError, MESSAGE_REQUIRED};
use crate::http::extractors::auth::SessionUser;
use crate::state::AppState;

/// Request body for sending a message.
#[derive(Debug, Deserialize)]
pub struct NewChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatsResponse {
    pub chats: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ListChatsResponse {
    pub message: &'static str,
    pub chats: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

/// POST /api/v1/chat/new
pub async fn new_chat(
    State(state): State<AppState>,
    SessionUser(identity): SessionUser,
    body: Result<Json<NewChatRequest>, JsonRejection>,
) -> Result<Json<ChatsResponse>, AppError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable chat request body");
        AppError::Validation(MESSAGE_REQUIRED.to_string())
    })?;

    let chats = state
        .chat_service
        .send_message(&identity, &request.message)
        .await?;

    Ok(Json(ChatsResponse { chats }))
}

/// GET /api/v1/chat/all-chats
pub async fn all_chats(
    State(state): State<AppState>,
    SessionUser(identity): SessionUser,
) -> Result<Json<ListChatsResponse>, AppError> {
    let chats = state.chat_service.list_messages(&identity).await?;
    Ok(Json(ListChatsResponse { message: "OK", chats }))
}

/// DELETE /api/v1/chat/delete
pub async fn delete_chats(
    State(state): State<AppState>,
    SessionUser(identity): SessionUser,
) -> Result<Json<StatusResponse>, AppError> {
    state.chat_service.clear_messages(&identity).await?;
    Ok(Json(StatusResponse { message: "OK" }))
}
