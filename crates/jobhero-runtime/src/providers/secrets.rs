//! API key handling.
//!
//! Keys are wrapped in [`SecretString`] as soon as they are read, so the
//! value only leaves the wrapper through [`ApiCredential::expose`] at the
//! point where a request header is set.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ModelError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Provider settings (config file)
    Config,
    /// Environment variable
    Environment,
    /// Passed in by code
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A redacted API key plus where it came from.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load from an environment variable. Empty values count as unset.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ModelError> {
        match std::env::var(env_var) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(Self::new(value, CredentialSource::Environment, name))
            }
            _ => Err(ModelError::NotConfigured(format!(
                "{} not set: configure '{}' environment variable",
                name, env_var
            ))),
        }
    }

    /// Load from `settings[config_key]`, falling back to `env_var`.
    pub fn from_config_or_env(
        settings: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, ModelError> {
        if let Some(value) = settings[config_key].as_str().filter(|v| !v.trim().is_empty()) {
            return Ok(Self::new(value, CredentialSource::Config, name));
        }

        Self::from_env(env_var, name).map_err(|_| {
            ModelError::NotConfigured(format!(
                "{} required: set '{}' in config or {} environment variable",
                name, config_key, env_var
            ))
        })
    }

    /// Whether a key could be loaded, without loading it.
    pub fn is_available(settings: &JsonValue, config_key: &str, env_var: &str) -> bool {
        settings[config_key]
            .as_str()
            .is_some_and(|v| !v.trim().is_empty())
            || std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty())
    }

    /// The raw key. Call only where the header is set; never store it.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_redacted() {
        let secret = "AIza-super-secret-key-12345";
        let cred = ApiCredential::new(secret, CredentialSource::Config, "Gemini API key");

        let debug = format!("{:?}", cred);
        assert!(!debug.contains(secret), "Secret exposed in Debug!");
        assert!(debug.contains("[REDACTED]"));

        let display = format!("{}", cred);
        assert!(!display.contains(secret), "Secret exposed in Display!");
        assert!(display.contains("Gemini API key from config"));

        assert_eq!(cred.expose(), secret);
    }

    #[test]
    fn test_config_preferred_over_env() {
        std::env::set_var("JOBHERO_TEST_KEY_PRIORITY", "env-key");
        let settings = serde_json::json!({ "api_key": "config-key" });

        let cred = ApiCredential::from_config_or_env(
            &settings,
            "api_key",
            "JOBHERO_TEST_KEY_PRIORITY",
            "Test key",
        )
        .unwrap();

        assert_eq!(cred.expose(), "config-key");
        assert_eq!(cred.source(), CredentialSource::Config);
        std::env::remove_var("JOBHERO_TEST_KEY_PRIORITY");
    }

    #[test]
    fn test_env_fallback() {
        std::env::set_var("JOBHERO_TEST_KEY_FALLBACK", "env-key");
        let settings = serde_json::json!({ "api_key": "" });

        let cred = ApiCredential::from_config_or_env(
            &settings,
            "api_key",
            "JOBHERO_TEST_KEY_FALLBACK",
            "Test key",
        )
        .unwrap();

        assert_eq!(cred.expose(), "env-key");
        assert_eq!(cred.source(), CredentialSource::Environment);
        std::env::remove_var("JOBHERO_TEST_KEY_FALLBACK");
    }

    #[test]
    fn test_missing_everywhere() {
        let err = ApiCredential::from_config_or_env(
            &serde_json::json!({}),
            "api_key",
            "JOBHERO_TEST_KEY_NONEXISTENT",
            "Test key",
        )
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Test key"));
        assert!(msg.contains("JOBHERO_TEST_KEY_NONEXISTENT"));
        assert!(!ApiCredential::is_available(
            &serde_json::json!({}),
            "api_key",
            "JOBHERO_TEST_KEY_NONEXISTENT"
        ));
    }
}
