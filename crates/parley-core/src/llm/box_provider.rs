//! BoxChatModel -- object-safe dynamic dispatch wrapper for ChatModel.
//!
//! 1. Define an object-safe `ChatModelDyn` trait with boxed futures
//! 2. Blanket-impl `ChatModelDyn` for all `T: ChatModel`
//! 3. `BoxChatModel` wraps `Box<dyn ChatModelDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{GenerateRequest, GenerateResponse, LlmError};

use super::provider::ChatModel;

/// Object-safe version of [`ChatModel`] with boxed futures.
pub trait ChatModelDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerateResponse, LlmError>> + Send + 'a>>;
}

impl<T: ChatModel> ChatModelDyn for T {
    fn name(&self) -> &str {
        ChatModel::name(self)
    }

    fn model(&self) -> &str {
        ChatModel::model(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerateResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }
}

/// Type-erased chat model.
///
/// Lets `ChatService` hold a provider chosen at startup (the Gemini client
/// in production, a scripted double in tests) without a type parameter.
pub struct BoxChatModel {
    inner: Box<dyn ChatModelDyn + Send + Sync>,
}

impl BoxChatModel {
    /// Wrap a concrete `ChatModel` in a type-erased box.
    pub fn new<T: ChatModel + 'static>(model: T) -> Self {
        Self {
            inner: Box::new(model),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    /// Send the conversation and receive the model's next turn.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, LlmError> {
        self.inner.generate_boxed(request).await
    }
}
