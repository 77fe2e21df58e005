//! Business logic and port definitions for Parley.
//!
//! This crate defines the "ports" (repository and model traits) that the
//! infrastructure layer implements, plus the chat logic built on them. It
//! depends only on `parley-types` -- never on `parley-infra` or any
//! database/HTTP crate.

pub mod chat;
pub mod llm;
pub mod repository;
