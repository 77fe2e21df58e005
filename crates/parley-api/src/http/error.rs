//! Application error type mapping to HTTP status codes.
//!
//! Every error response is `{"message": "<text>"}` with a non-2xx status.
//! Internal causes are logged and never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use parley_types::error::ChatError;

pub const NOT_REGISTERED: &str = "User not registered OR Token malfunctioned";
pub const PERMISSION_MISMATCH: &str = "Permissions didn't match";
pub const TOKEN_NOT_RECEIVED: &str = "Token Not Received";
pub const TOKEN_EXPIRED: &str = "Token Expired";
pub const MESSAGE_REQUIRED: &str = "Message is required";
const GENERIC_FAILURE: &str = "Something went wrong";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Authentication or ownership failure.
    Unauthorized(String),
    /// Request input failed validation.
    Validation(String),
    /// Anything else. Carries the cause for the log.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Unauthorized => AppError::Unauthorized(NOT_REGISTERED.to_string()),
            ChatError::PermissionMismatch => {
                AppError::Unauthorized(PERMISSION_MISMATCH.to_string())
            }
            ChatError::Validation(msg) => AppError::Validation(msg),
            other @ (ChatError::Relay(_) | ChatError::Repository(_)) => {
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(cause) => {
                tracing::error!(error = %cause, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::error::RepositoryError;
    use parley_types::llm::LlmError;

    #[test]
    fn test_chat_error_mapping() {
        assert!(matches!(
            AppError::from(ChatError::Unauthorized),
            AppError::Unauthorized(m) if m == NOT_REGISTERED
        ));
        assert!(matches!(
            AppError::from(ChatError::PermissionMismatch),
            AppError::Unauthorized(m) if m == PERMISSION_MISMATCH
        ));
        assert!(matches!(
            AppError::from(ChatError::Validation(MESSAGE_REQUIRED.to_string())),
            AppError::Validation(m) if m == MESSAGE_REQUIRED
        ));
        assert!(matches!(
            AppError::from(ChatError::Relay(LlmError::EmptyResponse)),
            AppError::Internal(_)
        ));
        assert!(matches!(
            AppError::from(ChatError::Repository(RepositoryError::NotFound)),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let resp = AppError::Unauthorized(TOKEN_EXPIRED.to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = AppError::Validation(MESSAGE_REQUIRED.to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = AppError::Internal("disk on fire".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
