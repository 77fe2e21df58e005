//! ChatModel trait definition.
//!
//! This is the core abstraction that model providers implement. Providers
//! are stateless: every call carries the full conversation.

use parley_types::llm::{GenerateRequest, GenerateResponse, LlmError};

/// Trait for generative chat backends (Gemini, test doubles).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in parley-infra (e.g., `GeminiProvider`).
pub trait ChatModel: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to (e.g., "gemini-pro").
    fn model(&self) -> &str;

    /// Send the conversation and receive the model's next turn.
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl std::future::Future<Output = Result<GenerateResponse, LlmError>> + Send;
}
