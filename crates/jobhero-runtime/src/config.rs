//! Runtime configuration.
//!
//! Loaded from YAML. Durations are human strings (`"2s"`, `"90s"`).
//!
//! ```yaml
//! provider:
//!   kind: gemini
//!   timeout: 90s
//! generation:
//!   primary_model: gemini-3-flash-preview
//!   fallback_model: gemini-2.5-flash-lite
//!   fallback_delay: 2s
//!   temperature: 0.7
//!   thinking_budget: 16384
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

pub const PRIMARY_MODEL_ENV: &str = "JOBHERO_PRIMARY_MODEL";
pub const FALLBACK_MODEL_ENV: &str = "JOBHERO_FALLBACK_MODEL";

pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_FALLBACK_MODEL: &str = "gemini-2.5-flash-lite";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub provider: ProviderConfig,
    pub generation: GenerationSettings,
}

impl RuntimeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Apply `JOBHERO_PRIMARY_MODEL` / `JOBHERO_FALLBACK_MODEL`.
    ///
    /// A fallback of `none` (or empty) disables the fallback model.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(
            std::env::var(PRIMARY_MODEL_ENV).ok(),
            std::env::var(FALLBACK_MODEL_ENV).ok(),
        )
    }

    fn apply_overrides(
        &mut self,
        primary: Option<String>,
        fallback: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(primary) = primary {
            debug!(model = %primary, "Primary model overridden from environment");
            self.generation.primary_model = primary.trim().to_string();
        }
        if let Some(fallback) = fallback {
            let fallback = fallback.trim();
            self.generation.fallback_model = if fallback.is_empty()
                || fallback.eq_ignore_ascii_case("none")
            {
                None
            } else {
                Some(fallback.to_string())
            };
            debug!(model = ?self.generation.fallback_model, "Fallback model overridden from environment");
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;

        if generation.primary_model.trim().is_empty() {
            return Err(ConfigError::Invalid("primary_model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be within 0.0..=2.0, got {}",
                generation.temperature
            )));
        }
        if generation.max_output_tokens == Some(0) {
            return Err(ConfigError::Invalid("max_output_tokens must be positive".to_string()));
        }
        if self.provider.kind.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.kind must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Which model client to build and how.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Registry name, e.g. `gemini`
    pub kind: String,

    /// Falls back to the provider's environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: "gemini".to_string(),
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(90),
        }
    }
}

impl ProviderConfig {
    /// Settings object handed to the provider factory.
    pub fn settings(&self) -> JsonValue {
        let mut settings = serde_json::json!({
            "timeout": humantime::format_duration(self.timeout).to_string(),
        });
        if let Some(key) = &self.api_key {
            settings["api_key"] = JsonValue::String(key.clone());
        }
        if let Some(url) = &self.base_url {
            settings["base_url"] = JsonValue::String(url.clone());
        }
        settings
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Model selection and generation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub primary_model: String,

    /// Model used once when the primary is rate limited
    pub fallback_model: Option<String>,

    /// Wait before the fallback call
    #[serde(with = "humantime_duration")]
    pub fallback_delay: Duration,

    pub temperature: f32,

    /// Reasoning budget sent when deep reasoning is requested
    pub thinking_budget: u32,

    pub max_output_tokens: Option<u32>,

    /// Validate coerced artifacts against their JSON Schema
    pub strict_validation: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: Some(DEFAULT_FALLBACK_MODEL.to_string()),
            fallback_delay: Duration::from_secs(2),
            temperature: 0.7,
            thinking_budget: 16_384,
            max_output_tokens: None,
            strict_validation: false,
        }
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.provider.kind, "gemini");
        assert_eq!(config.provider.timeout, Duration::from_secs(90));
        assert_eq!(config.generation.primary_model, "gemini-3-flash-preview");
        assert_eq!(
            config.generation.fallback_model.as_deref(),
            Some("gemini-2.5-flash-lite")
        );
        assert_eq!(config.generation.fallback_delay, Duration::from_secs(2));
        assert_eq!(config.generation.thinking_budget, 16_384);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_with_human_durations() {
        let yaml = r#"
provider:
  kind: gemini
  base_url: https://proxy.example/v1beta
  timeout: 1m 30s
generation:
  primary_model: gemini-2.5-pro
  fallback_model: null
  fallback_delay: 500ms
  temperature: 0.2
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.provider.timeout, Duration::from_secs(90));
        assert_eq!(config.generation.primary_model, "gemini-2.5-pro");
        assert_eq!(config.generation.fallback_model, None);
        assert_eq!(config.generation.fallback_delay, Duration::from_millis(500));
        // unspecified fields keep their defaults
        assert_eq!(config.generation.thinking_budget, 16_384);
    }

    #[test]
    fn test_bad_duration_rejected() {
        let yaml = "generation:\n  fallback_delay: whenever\n";
        assert!(matches!(RuntimeConfig::from_yaml(yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_invalid_temperature() {
        let yaml = "generation:\n  temperature: 3.5\n";
        assert!(matches!(RuntimeConfig::from_yaml(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = RuntimeConfig::default();
        config
            .apply_overrides(Some("gemini-2.5-pro".to_string()), Some("none".to_string()))
            .unwrap();
        assert_eq!(config.generation.primary_model, "gemini-2.5-pro");
        assert_eq!(config.generation.fallback_model, None);

        config
            .apply_overrides(None, Some("gemini-2.5-flash".to_string()))
            .unwrap();
        assert_eq!(config.generation.fallback_model.as_deref(), Some("gemini-2.5-flash"));

        assert!(config.apply_overrides(Some("  ".to_string()), None).is_err());
    }

    #[test]
    fn test_provider_settings_and_redaction() {
        let provider = ProviderConfig {
            api_key: Some("AIza-secret".to_string()),
            ..Default::default()
        };

        let settings = provider.settings();
        assert_eq!(settings["api_key"], "AIza-secret");
        assert_eq!(settings["timeout"], "1m 30s");
        assert!(settings.get("base_url").is_none());

        assert!(!format!("{:?}", provider).contains("AIza-secret"));
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::from_yaml_file("/nonexistent/jobhero.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
