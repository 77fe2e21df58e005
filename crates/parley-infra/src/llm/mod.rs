//! Chat model provider implementations.
//!
//! Contains the concrete implementation of the [`ChatModel`] trait defined
//! in `parley-core` for Google Gemini, plus a factory that builds the boxed
//! model the server runs with.
//!
//! [`ChatModel`]: parley_core::llm::provider::ChatModel

pub mod gemini;

use secrecy::SecretString;

use parley_core::llm::box_provider::BoxChatModel;
use parley_types::config::GeminiConfig;
use parley_types::llm::LlmError;

use self::gemini::GeminiProvider;

/// Create the server's [`BoxChatModel`] from the `[gemini]` config section.
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] when no API key is available.
pub fn create_chat_model(
    config: &GeminiConfig,
    api_key: Option<SecretString>,
) -> Result<BoxChatModel, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
    let provider = GeminiProvider::new(key, config)?;
    tracing::info!(model = %config.model, base_url = %config.base_url, "gemini chat model configured");
    Ok(BoxChatModel::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_chat_model() {
        let model = create_chat_model(&GeminiConfig::default(), Some(SecretString::from("k"))).unwrap();
        assert_eq!(model.name(), "gemini");
        assert_eq!(model.model(), "gemini-pro");
    }

    #[test]
    fn test_create_chat_model_missing_key() {
        match create_chat_model(&GeminiConfig::default(), None) {
            Err(LlmError::AuthenticationFailed) => {}
            Err(other) => panic!("Expected AuthenticationFailed, got: {other}"),
            Ok(_) => panic!("Expected error but got Ok"),
        }
    }
}
