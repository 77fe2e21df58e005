//! GeminiProvider -- concrete [`ChatModel`] implementation for Google Gemini.
//!
//! Sends the whole conversation to
//! `{base_url}/v1beta/models/{model}:generateContent` and returns the first
//! candidate's text. The API key travels in the `x-goog-api-key` header,
//! never in the URL, so it cannot leak into request logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::ChatModel;
use parley_types::config::GeminiConfig;
use parley_types::llm::{GenerateRequest, GenerateResponse, LlmError, Usage};

use super::types::{GeminiContent, GeminiErrorEnvelope, GeminiPart, GeminiRequest, GeminiResponse};

/// Google Gemini chat model.
///
/// Deliberately not `Debug`: it holds the API key.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Build a provider from the `[gemini]` config section.
    pub fn new(api_key: SecretString, config: &GeminiConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Override the base URL (mock servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn to_gemini_request(request: &GenerateRequest) -> GeminiRequest {
        let contents = request
            .contents
            .iter()
            .map(|c| GeminiContent {
                role: Some(c.role.to_string()),
                parts: c
                    .parts
                    .iter()
                    .map(|p| GeminiPart {
                        text: Some(p.text.clone()),
                    })
                    .collect(),
            })
            .collect();

        GeminiRequest { contents }
    }

    /// Map a non-success HTTP status to an [`LlmError`].
    fn error_for_status(status: reqwest::StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
        let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .map(|env| match env.error.status {
                Some(code) => format!("{code}: {}", env.error.message),
                None => env.error.message,
            })
            .unwrap_or_else(|_| body.to_string());

        match status.as_u16() {
            401 | 403 => LlmError::AuthenticationFailed,
            400 | 404 => LlmError::InvalidRequest(message),
            429 => LlmError::RateLimited {
                retry_after_ms: retry_after.map(|secs| secs.saturating_mul(1000)),
            },
            503 => LlmError::Overloaded(message),
            _ => LlmError::Provider {
                message: format!("HTTP {status}: {message}"),
            },
        }
    }

    /// Extract the reply from a parsed response body.
    fn into_generate_response(resp: GeminiResponse) -> Result<GenerateResponse, LlmError> {
        let usage = resp
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let Some(candidate) = resp.candidates.into_iter().next() else {
            if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(LlmError::InvalidRequest(format!("prompt blocked: {reason}")));
            }
            return Err(LlmError::EmptyResponse);
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(GenerateResponse {
            text,
            finish_reason: candidate.finish_reason,
            usage,
        })
    }
}

impl ChatModel for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let body = Self::to_gemini_request(request);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::error_for_status(status, retry_after, &error_body));
        }

        let gemini_resp: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        Self::into_generate_response(gemini_resp)
    }
}
