//! `parley user` commands.
//!
//! Registration is dev tooling: it writes the user record and prints a
//! session token so the API can be exercised without an identity service.

use anyhow::{Context, bail};

use parley_core::repository::user::UserRepository;
use parley_infra::sqlite::user::SqliteUserRepository;
use parley_types::error::RepositoryError;
use parley_types::user::{User, UserId};

use crate::http::extractors::auth::TokenKeys;

/// Create a user and return it with a fresh session token.
pub async fn create_user(
    repo: &SqliteUserRepository,
    tokens: &TokenKeys,
    name: &str,
    email: &str,
) -> anyhow::Result<(User, String)> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() {
        bail!("name and email must not be empty");
    }

    let user = match repo.create_user(&User::new(name, email)).await {
        Ok(user) => user,
        Err(RepositoryError::Conflict(msg)) => bail!("cannot create user: {msg}"),
        Err(e) => return Err(e.into()),
    };
    let token = tokens.issue(&user).context("failed to sign session token")?;

    tracing::info!(user_id = %user.id, "User created");
    Ok((user, token))
}

/// Issue a new session token for an existing user.
pub async fn issue_token(
    repo: &SqliteUserRepository,
    tokens: &TokenKeys,
    user_id: &str,
) -> anyhow::Result<String> {
    let id: UserId = user_id
        .parse()
        .with_context(|| format!("'{user_id}' is not a valid user id"))?;

    let Some(user) = repo.find_by_id(&id).await? else {
        bail!("no user with id {id}");
    };

    tokens.issue(&user).context("failed to sign session token")
}

/// Print a user and token the way both commands report them.
pub fn print_credentials(user: &User, token: &str) {
    println!();
    println!("  User:  {} <{}>", user.name, user.email);
    println!("  Id:    {}", user.id);
    println!("  Token: {token}");
    println!();
}
