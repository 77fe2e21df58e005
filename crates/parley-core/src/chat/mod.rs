//! Conversation handling: history assembly, relay orchestration, and
//! per-user write serialization.

pub mod history;
pub mod lock;
pub mod service;
