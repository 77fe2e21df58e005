//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `parley-core` using sqlx with split
//! read/write pools. Conversation order is carried by an explicit per-user
//! `seq` column rather than timestamps, so two messages written in the same
//! instant still come back in append order.

use chrono::{DateTime, Utc};
use parley_core::repository::user::UserRepository;
use parley_types::chat::{Message, MessageRole};
use parley_types::error::RepositoryError;
use parley_types::user::{User, UserId};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct UserRow {
    id: String,
    name: String,
    email: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self, chats: Vec<Message>) -> Result<User, RepositoryError> {
        let id: UserId = self
            .id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;

        Ok(User {
            id,
            name: self.name,
            email: self.email,
            created_at: parse_datetime(&self.created_at)?,
            chats,
        })
    }
}

struct MessageRow {
    id: String,
    role: String,
    content: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Message {
            id,
            role,
            content: self.content,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

async fn user_exists(
    conn: &mut sqlx::SqliteConnection,
    id: &UserId,
) -> Result<bool, RepositoryError> {
    let row = sqlx::query("SELECT 1 FROM users WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(conn)
        .await
        .map_err(query_err)?;
    Ok(row.is_some())
}

// ---------------------------------------------------------------------------
// UserRepository implementation
// ---------------------------------------------------------------------------

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let result = sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES (?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.name)
            .bind(&user.email)
            .bind(format_datetime(&user.created_at))
            .execute(&mut *tx)
            .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                return Err(RepositoryError::Conflict(format!(
                    "email '{}' already registered",
                    user.email
                )));
            }
            Err(e) => return Err(query_err(e)),
        }

        for (seq, message) in user.chats.iter().enumerate() {
            insert_message(&mut tx, &user.id, seq as i64 + 1, message).await?;
        }

        tx.commit().await.map_err(query_err)?;
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user_row = UserRow::from_row(&row).map_err(query_err)?;

        let rows = sqlx::query(
            "SELECT id, role, content FROM chat_messages WHERE user_id = ? ORDER BY seq ASC",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(query_err)?;
            chats.push(msg_row.into_message()?);
        }

        Ok(Some(user_row.into_user(chats)?))
    }

    async fn append_messages(
        &self,
        id: &UserId,
        messages: &[Message],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        if !user_exists(&mut tx, id).await? {
            return Err(RepositoryError::NotFound);
        }

        let last_seq: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(seq), 0) FROM chat_messages WHERE user_id = ?")
                .bind(id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(query_err)?;

        for (offset, message) in messages.iter().enumerate() {
            insert_message(&mut tx, id, last_seq + 1 + offset as i64, message).await?;
        }

        tx.commit().await.map_err(query_err)?;
        Ok(())
    }

    async fn clear_messages(&self, id: &UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        if !user_exists(&mut tx, id).await? {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM chat_messages WHERE user_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;
        Ok(())
    }
}

async fn insert_message(
    conn: &mut sqlx::SqliteConnection,
    user_id: &UserId,
    seq: i64,
    message: &Message,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"INSERT INTO chat_messages (id, user_id, seq, role, content, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(message.id.to_string())
    .bind(user_id.to_string())
    .bind(seq)
    .bind(message.role.to_string())
    .bind(&message.content)
    .bind(format_datetime(&Utc::now()))
    .execute(conn)
    .await
    .map_err(query_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::database_url_for;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = database_url_for(dir.path());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn test_repo_with_user() -> (SqliteUserRepository, User) {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = repo
            .create_user(&User::new("Ada", "ada@example.com"))
            .await
            .unwrap();
        (repo, user)
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let (repo, user) = test_repo_with_user().await;

        let found = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.name, "Ada");
        assert_eq!(found.email, "ada@example.com");
        assert!(found.chats.is_empty());
    }

    #[tokio::test]
    async fn test_find_missing_user_is_none() {
        let repo = SqliteUserRepository::new(test_pool().await);
        assert!(repo.find_by_id(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (repo, _user) = test_repo_with_user().await;
        let err = repo
            .create_user(&User::new("Other Ada", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_append_preserves_order_across_calls() {
        let (repo, user) = test_repo_with_user().await;

        let first = [Message::user("a"), Message::assistant("b")];
        let second = [Message::user("c"), Message::assistant("d")];
        repo.append_messages(&user.id, &first).await.unwrap();
        repo.append_messages(&user.id, &second).await.unwrap();

        let chats = repo.find_by_id(&user.id).await.unwrap().unwrap().chats;
        let contents: Vec<&str> = chats.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c", "d"]);
        assert_eq!(chats[0], first[0]);
        assert_eq!(chats[3], second[1]);
    }

    #[tokio::test]
    async fn test_append_to_missing_user_is_not_found() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let err = repo
            .append_messages(&UserId::new(), &[Message::user("a")])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent_and_append_resumes() {
        let (repo, user) = test_repo_with_user().await;
        repo.append_messages(&user.id, &[Message::user("a"), Message::assistant("b")])
            .await
            .unwrap();

        repo.clear_messages(&user.id).await.unwrap();
        assert!(repo.find_by_id(&user.id).await.unwrap().unwrap().chats.is_empty());

        repo.clear_messages(&user.id).await.unwrap();
        assert!(repo.find_by_id(&user.id).await.unwrap().unwrap().chats.is_empty());

        repo.append_messages(&user.id, &[Message::user("fresh")])
            .await
            .unwrap();
        let chats = repo.find_by_id(&user.id).await.unwrap().unwrap().chats;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].content, "fresh");
    }

    #[tokio::test]
    async fn test_clear_missing_user_is_not_found() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let err = repo.clear_messages(&UserId::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_clear_leaves_other_users_alone() {
        let (repo, ada) = test_repo_with_user().await;
        let bob = repo
            .create_user(&User::new("Bob", "bob@example.com"))
            .await
            .unwrap();
        repo.append_messages(&ada.id, &[Message::user("ada")]).await.unwrap();
        repo.append_messages(&bob.id, &[Message::user("bob")]).await.unwrap();

        repo.clear_messages(&ada.id).await.unwrap();

        let bob_chats = repo.find_by_id(&bob.id).await.unwrap().unwrap().chats;
        assert_eq!(bob_chats.len(), 1);
    }
}
