use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from chat operations.
///
/// `Unauthorized` and `PermissionMismatch` are caller-facing; everything
/// else is an internal failure whose cause is logged but not surfaced.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("user not registered")]
    Unauthorized,

    #[error("permissions didn't match")]
    PermissionMismatch,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("relay failed: {0}")]
    Relay(#[from] LlmError),

    #[error("repository failed: {0}")]
    Repository(#[from] RepositoryError),
}
