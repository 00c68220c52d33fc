//! Model client abstractions for jobhero-runtime.
//!
//! A [`ModelClient`] performs exactly one generation call. It never
//! retries; retries belong to [`crate::resilience::FallbackClient`].
//!
//! ## Security
//!
//! Clients load their API key through [`secrets::ApiCredential`], which
//! keeps the value out of Debug and Display output.

use async_trait::async_trait;
use jobhero_core::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(feature = "gemini")]
mod gemini;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiClient, GeminiClientFactory, GEMINI_API_KEY_ENV};

/// Errors from a single model call.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Model rate limited or unavailable: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Could not parse model endpoint response: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Model client not configured: {0}")]
    NotConfigured(String),
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::RateLimited { .. } => ErrorKind::RateLimit,
            ModelError::EmptyResponse => ErrorKind::EmptyResponse,
            ModelError::ParseError(_) => ErrorKind::MalformedResponse,
            ModelError::HttpError(_)
            | ModelError::ApiError { .. }
            | ModelError::AuthError
            | ModelError::Timeout(_)
            | ModelError::NotConfigured(_) => ErrorKind::Transport,
        }
    }

    /// Only quota exhaustion and unavailability are worth a fallback call.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Per-call generation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,

    pub max_output_tokens: Option<u32>,

    /// JSON Schema the response must follow
    pub response_schema: Option<JsonValue>,

    /// Ask for `application/json` output
    pub json_response: bool,

    /// Extended reasoning budget in tokens
    pub thinking_budget: Option<u32>,

    /// Let the model ground its answer in web search results
    pub search_grounding: bool,
}

impl GenerationConfig {
    /// The same config with any reasoning budget removed.
    ///
    /// Lighter fallback models reject thinking options.
    pub fn without_reasoning(&self) -> Self {
        Self {
            thinking_budget: None,
            ..self.clone()
        }
    }
}

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub content: String,
    pub config: GenerationConfig,
}

/// A web page the model cited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Token usage from a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the generated candidates
    pub completion_tokens: u32,

    /// Tokens spent on reasoning, if reported
    pub thinking_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens + self.thinking_tokens
    }
}

/// Raw result of a generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: String,
    pub grounding_sources: Vec<GroundingSource>,

    /// Model that actually served the call
    pub model: String,
    pub usage: TokenUsage,
}

/// Single-shot transport to a generative model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Execute one generation call.
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError>;

    /// Check if the client can make calls at all.
    async fn health_check(&self) -> bool;

    /// Client name for logs.
    fn name(&self) -> &str;

    /// Estimate tokens for a prompt.
    fn estimate_tokens(&self, text: &str) -> u32 {
        // ~4 chars per token
        (text.len() / 4) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let rate_limited = ModelError::RateLimited {
            message: "quota".to_string(),
            retry_after: None,
        };
        assert_eq!(rate_limited.kind(), ErrorKind::RateLimit);
        assert!(rate_limited.is_retryable());

        assert_eq!(ModelError::AuthError.kind(), ErrorKind::Transport);
        assert_eq!(
            ModelError::HttpError("reset".to_string()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(ModelError::EmptyResponse.kind(), ErrorKind::EmptyResponse);
        assert!(!ModelError::EmptyResponse.is_retryable());
        assert!(!ModelError::Timeout(Duration::from_secs(1)).is_retryable());
    }

    #[test]
    fn test_without_reasoning_keeps_rest() {
        let config = GenerationConfig {
            temperature: Some(0.7),
            json_response: true,
            thinking_budget: Some(16_384),
            ..Default::default()
        };

        let lighter = config.without_reasoning();
        assert_eq!(lighter.thinking_budget, None);
        assert_eq!(lighter.temperature, Some(0.7));
        assert!(lighter.json_response);
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 50,
            thinking_tokens: 25,
        };
        assert_eq!(usage.total(), 175);
    }
}
