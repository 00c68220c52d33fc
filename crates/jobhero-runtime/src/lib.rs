//! # jobhero-runtime
//!
//! Model calls and the flows around them.
//!
//! `jobhero-core` decides what to ask and how to read the answer; this
//! crate does the asking. It provides:
//! - [`providers`]: the single-shot [`ModelClient`] seam and the Gemini client
//! - [`resilience`]: one fallback call when the primary model is rate limited
//! - [`orchestrator`]: one method per artifact, prompt to typed result
//! - [`payment`]: the one-time unlock flow
//!
//! ## Example
//!
//! ```rust,ignore
//! use jobhero_runtime::{GenerationOrchestrator, ProviderRegistry, RuntimeConfig};
//!
//! let mut config = RuntimeConfig::from_yaml_file("jobhero.yaml")?;
//! config.apply_env_overrides()?;
//!
//! let orchestrator = GenerationOrchestrator::from_config(&config, &ProviderRegistry::with_defaults())?;
//! let toolkit = orchestrator.generate_toolkit(&profile).await?;
//! println!("{}", toolkit.value.resume);
//! ```

pub mod config;
pub mod orchestrator;
pub mod payment;
pub mod providers;
pub mod resilience;
pub mod usage;

pub use config::{ConfigError, GenerationSettings, ProviderConfig, RuntimeConfig};
pub use orchestrator::{GenerationError, GenerationOrchestrator, GenerationOrchestratorBuilder};
pub use payment::{
    unlock_entitlement, CheckoutRequest, PaymentError, PaymentGateway, Prefill, SimulatedGateway,
    UnlockReceipt,
};
pub use providers::{
    GenerationConfig, GroundingSource, ModelClient, ModelError, ModelRequest, ModelResponse,
    ProviderFactory, ProviderRegistry, TokenUsage,
};
pub use resilience::{FallbackClient, FallbackOutcome, FallbackPolicy};
pub use usage::{GenerationUsage, UsageTracker};
