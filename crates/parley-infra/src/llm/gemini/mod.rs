//! Google Gemini chat model provider.
//!
//! [`GeminiProvider`] implements
//! [`ChatModel`](parley_core::llm::provider::ChatModel) against the
//! `generateContent` REST endpoint. Replies are requested whole; there is
//! no streaming.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
