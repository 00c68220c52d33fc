//! CLI command implementations.

pub mod export;
pub mod generate;
pub mod share;
pub mod unlock;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Serialize;
use tracing::{debug, info};

use jobhero_core::{template_access, FileEntitlementStore, ResumeTemplate, TemplateAccess, UserInput};
use jobhero_runtime::{GenerationOrchestrator, ProviderRegistry, RuntimeConfig};

/// Options shared by every command.
pub struct Context {
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub state: PathBuf,
}

impl Context {
    /// Orchestrator from the config file (or defaults) plus env overrides.
    pub fn orchestrator(&self) -> Result<GenerationOrchestrator> {
        let mut config = match &self.config {
            Some(path) => RuntimeConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => RuntimeConfig::default(),
        };
        config.apply_env_overrides()?;

        debug!(
            provider = %config.provider.kind,
            primary = %config.generation.primary_model,
            fallback = ?config.generation.fallback_model,
            "Runtime config loaded"
        );

        GenerationOrchestrator::from_config(&config, &ProviderRegistry::with_defaults())
            .context("Failed to set up the model client")
    }

    pub fn entitlements(&self) -> FileEntitlementStore {
        FileEntitlementStore::new(&self.state)
    }

    /// Fail unless `template` is free or the unlock has been bought.
    pub fn require_template(&self, template: ResumeTemplate) -> Result<()> {
        match template_access(&self.entitlements(), template)
            .with_context(|| format!("Failed to read {}", self.state.display()))?
        {
            TemplateAccess::Granted => Ok(()),
            TemplateAccess::RequiresUnlock => anyhow::bail!(
                "The {} template requires the elite unlock (run `jobhero unlock`)",
                template
            ),
        }
    }

    /// Pretty JSON to `--out` or stdout.
    pub fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_text(&json)
    }

    pub fn write_text(&self, text: &str) -> Result<()> {
        match &self.out {
            Some(path) => {
                write_file(path, text)?;
                info!(path = %path.display(), "Wrote output");
            }
            None => println!("{}", text),
        }
        Ok(())
    }
}

/// Read a profile from YAML or JSON.
pub fn load_profile(path: &Path) -> Result<UserInput> {
    let text = read_text(path)?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse profile {}", path.display()))
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// `@path` reads the file, anything else is taken literally.
pub fn text_or_file(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => read_text(Path::new(path)),
        None => Ok(value.to_string()),
    }
}
