//! Session token issuing and verification.
//!
//! A session token is an HS256 JWT whose `id` claim names the user. It is
//! read from:
//! - the session cookie (`auth_token` unless configured otherwise)
//! - `Authorization: Bearer <token>` header
//!
//! Verifying a token only establishes the claimed identity. Whether that
//! identity is a registered user is decided by `ChatService`.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use parley_types::user::{SessionIdentity, User};

use crate::http::error::{AppError, TOKEN_EXPIRED, TOKEN_NOT_RECEIVED};
use crate::state::AppState;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys for session tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenKeys {
    pub fn new(secret: &SecretString, ttl_days: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl: chrono::Duration::days(ttl_days),
        }
    }

    /// Issue a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = SessionClaims {
            id: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}

/// The verified session identity of the caller.
pub struct SessionUser(pub SessionIdentity);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts, &state.config.auth.cookie_name)
            .ok_or_else(|| AppError::Unauthorized(TOKEN_NOT_RECEIVED.to_string()))?;

        let claims = state.tokens.verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::Unauthorized(TOKEN_EXPIRED.to_string())
        })?;

        Ok(SessionUser(SessionIdentity::new(claims.id)))
    }
}

/// Extract the token from the session cookie, else the bearer header.
fn extract_token(parts: &Parts, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(token) = jar
        .get(cookie_name)
        .map(|c| c.value_trimmed().to_string())
        .filter(|t| !t.is_empty())
    {
        return Some(token);
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
