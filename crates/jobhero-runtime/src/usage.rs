//! Usage accounting across generation calls.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::providers::TokenUsage;

/// Accumulated usage for an orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationUsage {
    /// Logical generation requests
    pub generations: u32,

    /// Network calls, including fallback calls
    pub model_calls: u32,

    /// Requests served by the fallback model
    pub fallback_generations: u32,

    /// Artifacts that needed optional fields defaulted
    pub degraded_artifacts: u32,

    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub thinking_tokens: u32,
    pub total_tokens: u32,
}

impl GenerationUsage {
    pub fn add(&mut self, usage: &TokenUsage, attempts: usize, used_fallback: bool) {
        self.generations += 1;
        self.model_calls += attempts as u32;
        if used_fallback {
            self.fallback_generations += 1;
        }
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.thinking_tokens += usage.thinking_tokens;
        self.total_tokens += usage.total();
    }
}

/// Thread-safe holder for [`GenerationUsage`].
#[derive(Debug, Default)]
pub struct UsageTracker {
    usage: RwLock<GenerationUsage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: &TokenUsage, attempts: usize, used_fallback: bool) {
        self.usage.write().add(usage, attempts, used_fallback);
    }

    pub fn record_degraded(&self) {
        self.usage.write().degraded_artifacts += 1;
    }

    pub fn get(&self) -> GenerationUsage {
        self.usage.read().clone()
    }

    pub fn reset(&self) {
        *self.usage.write() = GenerationUsage::default();
    }
}
