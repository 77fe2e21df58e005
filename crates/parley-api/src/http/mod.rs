//! HTTP/REST API layer for Parley.
//!
//! Axum-based API under `/api/v1/chat` with session-token authentication
//! and CORS support. Every failure body is `{"message": "..."}`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
