//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the workspace:
//! User, Message, the wire-neutral chat content exchanged with the model,
//! configuration, and the associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod user;
