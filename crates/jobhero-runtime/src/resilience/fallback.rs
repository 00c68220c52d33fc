//! Primary/fallback model selection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::GenerationSettings;
use crate::providers::{GenerationConfig, ModelClient, ModelError, ModelRequest, ModelResponse};

/// Which models to try, and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    pub primary_model: String,

    /// `None` disables the fallback call
    pub fallback_model: Option<String>,

    pub delay: Duration,
}

impl From<&GenerationSettings> for FallbackPolicy {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            primary_model: settings.primary_model.clone(),
            fallback_model: settings.fallback_model.clone(),
            delay: settings.fallback_delay,
        }
    }
}

/// Result of a call that may have been served by the fallback model.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackOutcome {
    pub response: ModelResponse,
    pub used_fallback: bool,

    /// Network calls made, 1 or 2
    pub attempts: usize,
}

/// Wraps a [`ModelClient`] with a single rate-limit fallback.
///
/// The primary model gets the full config. If it fails with a retryable
/// error and a fallback model is configured, the call is retried once on
/// the fallback model after `delay`, with the reasoning budget stripped.
/// Every other failure, and a second failure, is returned unchanged.
#[derive(Clone)]
pub struct FallbackClient {
    client: Arc<dyn ModelClient>,
    policy: FallbackPolicy,
}

impl FallbackClient {
    pub fn new(client: Arc<dyn ModelClient>, policy: FallbackPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    pub fn client(&self) -> &Arc<dyn ModelClient> {
        &self.client
    }

    pub async fn generate(
        &self,
        system_instruction: Option<&str>,
        content: &str,
        config: &GenerationConfig,
    ) -> Result<FallbackOutcome, ModelError> {
        let attempts = AtomicUsize::new(0);
        let primary = self.policy.primary_model.as_str();
        let fallback = self.policy.fallback_model.as_deref();
        let reduced = config.without_reasoning();

        let call = || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            let (model, config) = match fallback {
                Some(model) if attempt > 0 => (model, &reduced),
                _ => (primary, config),
            };
            let request = ModelRequest {
                model: model.to_string(),
                system_instruction: system_instruction.map(str::to_string),
                content: content.to_string(),
                config: config.clone(),
            };
            let client = Arc::clone(&self.client);
            async move { client.generate(&request).await }
        };

        let backoff = ConstantBuilder::default()
            .with_delay(self.policy.delay)
            .with_max_times(usize::from(fallback.is_some()));

        let response = call
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(|e: &ModelError| e.is_retryable())
            .notify(|e: &ModelError, delay: Duration| {
                warn!(
                    primary = %primary,
                    fallback = ?fallback,
                    delay = ?delay,
                    error = %e,
                    "Primary model unavailable, retrying once on fallback model"
                );
            })
            .await?;

        let attempts = attempts.load(Ordering::SeqCst);
        Ok(FallbackOutcome {
            response,
            used_fallback: attempts > 1,
            attempts,
        })
    }
}

impl std::fmt::Debug for FallbackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackClient")
            .field("client", &self.client.name())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays scripted results and records every request.
    struct ScriptedClient {
        script: Mutex<VecDeque<Result<ModelResponse, ModelError>>>,
        calls: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<ModelResponse, ModelError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<ModelRequest> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
            self.calls.lock().push(request.clone());
            self.script
                .lock()
                .pop_front()
                .unwrap_or(Err(ModelError::NotConfigured("script exhausted".to_string())))
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn ok(text: &str) -> Result<ModelResponse, ModelError> {
        Ok(ModelResponse {
            text: text.to_string(),
            ..Default::default()
        })
    }

    fn rate_limited() -> Result<ModelResponse, ModelError> {
        Err(ModelError::RateLimited {
            message: "RESOURCE_EXHAUSTED".to_string(),
            retry_after: None,
        })
    }

    fn policy(fallback: Option<&str>) -> FallbackPolicy {
        FallbackPolicy {
            primary_model: "primary".to_string(),
            fallback_model: fallback.map(str::to_string),
            delay: Duration::from_secs(2),
        }
    }

    fn deep_config() -> GenerationConfig {
        GenerationConfig {
            temperature: Some(0.7),
            json_response: true,
            thinking_budget: Some(16_384),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_falls_back_once() {
        let client = ScriptedClient::new(vec![rate_limited(), ok("from fallback")]);
        let fallback = FallbackClient::new(client.clone(), policy(Some("lite")));

        let start = tokio::time::Instant::now();
        let outcome = fallback
            .generate(Some("system"), "content", &deep_config())
            .await
            .unwrap();

        assert_eq!(outcome.response.text, "from fallback");
        assert!(outcome.used_fallback);
        assert_eq!(outcome.attempts, 2);
        assert!(start.elapsed() >= Duration::from_secs(2));

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].model, "primary");
        assert_eq!(calls[0].config.thinking_budget, Some(16_384));
        assert_eq!(calls[1].model, "lite");
        assert_eq!(calls[1].config.thinking_budget, None);
        assert_eq!(calls[1].config.temperature, Some(0.7));
        assert_eq!(calls[1].system_instruction.as_deref(), Some("system"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_not_retried() {
        let client = ScriptedClient::new(vec![
            Err(ModelError::HttpError("connection reset".to_string())),
            ok("never"),
        ]);
        let fallback = FallbackClient::new(client.clone(), policy(Some("lite")));

        let err = fallback
            .generate(None, "content", &deep_config())
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::HttpError(_)));
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_failure_propagates() {
        let client = ScriptedClient::new(vec![rate_limited(), rate_limited(), ok("never")]);
        let fallback = FallbackClient::new(client.clone(), policy(Some("lite")));

        let err = fallback
            .generate(None, "content", &deep_config())
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fallback_model_means_single_call() {
        let client = ScriptedClient::new(vec![rate_limited(), ok("never")]);
        let fallback = FallbackClient::new(client.clone(), policy(None));

        let err = fallback
            .generate(None, "content", &deep_config())
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::RateLimited { .. }));
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_primary_success() {
        let client = ScriptedClient::new(vec![ok("primary text")]);
        let fallback = FallbackClient::new(client.clone(), policy(Some("lite")));

        let outcome = fallback
            .generate(None, "content", &deep_config())
            .await
            .unwrap();

        assert_eq!(outcome.response.text, "primary text");
        assert!(!outcome.used_fallback);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(client.calls()[0].config.thinking_budget, Some(16_384));
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = FallbackPolicy::from(&GenerationSettings::default());
        assert_eq!(policy.primary_model, "gemini-3-flash-preview");
        assert_eq!(policy.fallback_model.as_deref(), Some("gemini-2.5-flash-lite"));
        assert_eq!(policy.delay, Duration::from_secs(2));
    }
}
