//! UserRepository trait definition.
//!
//! Provides the record-store operations the chat layer needs: look a user
//! up with their conversation, append to the conversation, and clear it.

use parley_types::chat::Message;
use parley_types::error::RepositoryError;
use parley_types::user::{User, UserId};

/// Repository trait for user and conversation persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteUserRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the email is taken.
    fn create_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Fetch a user by id, with `chats` populated in conversation order.
    fn find_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Append messages to the end of a user's conversation.
    ///
    /// All messages are written or none are. Fails with `NotFound` if the
    /// user does not exist.
    fn append_messages(
        &self,
        id: &UserId,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Reset a user's conversation to empty. Fails with `NotFound` if the
    /// user does not exist; clearing an empty conversation succeeds.
    fn clear_messages(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
