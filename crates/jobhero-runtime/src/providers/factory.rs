//! Named model client factories.
//!
//! A client is created from a provider name plus JSON settings, so a
//! config file can pick the backend without code changes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{ModelClient, ModelError};

/// Creates a model client from JSON settings.
pub trait ProviderFactory: Send + Sync {
    /// Name used in config (`provider.kind`).
    fn provider_type(&self) -> &'static str;

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn ModelClient>, ModelError>;

    /// Check settings without creating a client.
    fn validate_config(&self, settings: &JsonValue) -> Result<(), ModelError>;

    fn default_config(&self) -> JsonValue {
        serde_json::json!({})
    }

    fn description(&self) -> &'static str {
        "Model client"
    }
}

/// Provider name to factory.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any with the same name.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories
            .insert(factory.provider_type().to_string(), factory);
    }

    pub fn create(
        &self,
        provider_type: &str,
        settings: &JsonValue,
    ) -> Result<Arc<dyn ModelClient>, ModelError> {
        self.factory(provider_type)?.create(settings)
    }

    pub fn validate(&self, provider_type: &str, settings: &JsonValue) -> Result<(), ModelError> {
        self.factory(provider_type)?.validate_config(settings)
    }

    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    pub fn has_provider(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    pub fn default_config(&self, provider_type: &str) -> Option<JsonValue> {
        self.factories
            .get(provider_type)
            .map(|f| f.default_config())
    }

    fn factory(&self, provider_type: &str) -> Result<&Arc<dyn ProviderFactory>, ModelError> {
        self.factories.get(provider_type).ok_or_else(|| {
            ModelError::NotConfigured(format!(
                "Unknown provider type: '{}'. Available: {:?}",
                provider_type,
                self.available_types()
            ))
        })
    }

    /// Registry with every client compiled into this build.
    #[cfg(feature = "gemini")]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::GeminiClientFactory));
        registry
    }

    /// Registry with every client compiled into this build.
    #[cfg(not(feature = "gemini"))]
    pub fn with_defaults() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}
