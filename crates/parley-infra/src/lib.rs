//! Infrastructure layer for Parley.
//!
//! Contains implementations of the ports defined in `parley-core`: SQLite
//! user storage and the Gemini chat model client. Also owns configuration
//! loading and data directory resolution.

pub mod config;
pub mod llm;
pub mod sqlite;
