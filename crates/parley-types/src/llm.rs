//! Model request/response types for Parley.
//!
//! These types model the data shapes exchanged with a generative chat
//! model: role-tagged content turns, generation requests, usage tracking,
//! and error handling. They are provider-agnostic; the Gemini adapter in
//! parley-infra serializes them to its own wire structs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a content turn in the model's vocabulary.
///
/// Distinct from [`crate::chat::MessageRole`]: stored `assistant` turns are
/// presented to the model as `model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    User,
    Model,
}

impl fmt::Display for ContentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRole::User => write!(f, "user"),
            ContentRole::Model => write!(f, "model"),
        }
    }
}

impl FromStr for ContentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(ContentRole::User),
            "model" => Ok(ContentRole::Model),
            other => Err(format!("invalid content role: '{other}'")),
        }
    }
}

/// A single piece of a content turn. Only text is supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One role-tagged turn of history sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContent {
    pub role: ContentRole,
    pub parts: Vec<Part>,
}

impl ChatContent {
    /// A single-part text turn.
    pub fn text(role: ContentRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// All text parts joined together.
    pub fn joined_text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// A generation request: the full ordered conversation, newest turn last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: Vec<ChatContent>,
}

/// The model's reply to a [`GenerateRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

/// Token usage reported by the provider, when available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from model provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("model returned no text")]
    EmptyResponse,
}
