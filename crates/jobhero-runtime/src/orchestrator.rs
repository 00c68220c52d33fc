//! Generation orchestrator.
//!
//! Every operation runs the same pipeline:
//! prompt builder -> fallback client -> response coercer.
//! An artifact either comes back fully coerced (possibly with defaulted
//! optional fields, see [`Coerced::defaulted`]) or the whole operation
//! fails with a [`GenerationError`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use jobhero_core::{
    coerce_with, Artifact, ArtifactKind, CareerRoadmap, CoercionError, CoercionOptions, Coerced,
    CompanyInsights, EliteTools, ErrorKind, InterviewFeedback, JobToolkit, Prompt, PromptBuilder,
    ResumeAnalysis, RoadmapStep, UserInput,
};

use crate::config::{GenerationSettings, RuntimeConfig};
use crate::providers::{GenerationConfig, ModelClient, ModelError, ProviderRegistry};
use crate::resilience::{FallbackClient, FallbackOutcome, FallbackPolicy};
use crate::usage::{GenerationUsage, UsageTracker};

/// Errors from an orchestrated generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation failed: {0}")]
    Model(#[from] ModelError),

    #[error("Generation failed: {0}")]
    Coercion(#[from] CoercionError),

    #[error("Orchestrator not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Model(e) => e.kind(),
            GenerationError::Coercion(e) => e.kind(),
            GenerationError::NotConfigured(_) => ErrorKind::Transport,
        }
    }
}

/// Turns profiles into generated artifacts.
pub struct GenerationOrchestrator {
    fallback: FallbackClient,
    settings: GenerationSettings,
    usage: UsageTracker,
}

impl GenerationOrchestrator {
    pub fn new(client: Arc<dyn ModelClient>, settings: GenerationSettings) -> Self {
        Self {
            fallback: FallbackClient::new(client, FallbackPolicy::from(&settings)),
            settings,
            usage: UsageTracker::new(),
        }
    }

    /// Build the configured provider from `registry` and wrap it.
    pub fn from_config(
        config: &RuntimeConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, GenerationError> {
        let client = registry.create(&config.provider.kind, &config.provider.settings())?;
        Ok(Self::new(client, config.generation.clone()))
    }

    pub fn builder() -> GenerationOrchestratorBuilder {
        GenerationOrchestratorBuilder::new()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Resume, cover letter, LinkedIn content, interview questions and roadmap.
    pub async fn generate_toolkit(
        &self,
        input: &UserInput,
    ) -> Result<Coerced<JobToolkit>, GenerationError> {
        let config = self.structured_config(ArtifactKind::JobToolkit);
        self.run(PromptBuilder::toolkit(input), config).await
    }

    /// A fresh roadmap for `role`.
    ///
    /// `deep_reasoning` sends the configured thinking budget to the
    /// primary model; the fallback model never gets it.
    pub async fn regenerate_roadmap(
        &self,
        input: &UserInput,
        role: &str,
        deep_reasoning: bool,
    ) -> Result<Coerced<Vec<RoadmapStep>>, GenerationError> {
        let mut config = self.structured_config(ArtifactKind::CareerRoadmap);
        if deep_reasoning {
            config.thinking_budget = Some(self.settings.thinking_budget);
        }

        let roadmap: Coerced<CareerRoadmap> =
            self.run(PromptBuilder::roadmap(input, role), config).await?;
        Ok(roadmap.map(|r| r.career_roadmap))
    }

    pub async fn analyze_resume(
        &self,
        resume_text: &str,
        role: &str,
    ) -> Result<Coerced<ResumeAnalysis>, GenerationError> {
        let config = self.structured_config(ArtifactKind::ResumeAnalysis);
        self.run(PromptBuilder::resume_audit(resume_text, role), config)
            .await
    }

    pub async fn analyze_interview_answer(
        &self,
        question: &str,
        answer: &str,
        role: &str,
        company: &str,
    ) -> Result<Coerced<InterviewFeedback>, GenerationError> {
        let config = self.structured_config(ArtifactKind::InterviewFeedback);
        let prompt = PromptBuilder::interview_feedback(question, answer, role, company);
        self.run(prompt, config).await
    }

    /// Profile fields found in free text (a pasted resume, say).
    pub async fn extract_profile(
        &self,
        raw_text: &str,
    ) -> Result<Coerced<UserInput>, GenerationError> {
        let config = self.structured_config(ArtifactKind::ProfileExtraction);
        self.run(PromptBuilder::profile_extraction(raw_text), config)
            .await
    }

    pub async fn generate_elite_tools(
        &self,
        input: &UserInput,
    ) -> Result<Coerced<EliteTools>, GenerationError> {
        let config = self.structured_config(ArtifactKind::EliteTools);
        self.run(PromptBuilder::elite_tools(input), config).await
    }

    /// Search-grounded company research.
    ///
    /// Grounding cannot be combined with a response schema, so the model
    /// may answer in prose. A reply with no usable JSON (none found, not
    /// parseable, or no `text` field) is kept verbatim as the insight text.
    pub async fn fetch_company_insights(
        &self,
        company: &str,
    ) -> Result<Coerced<CompanyInsights>, GenerationError> {
        let config = GenerationConfig {
            search_grounding: true,
            ..self.base_config()
        };

        let outcome = self
            .call(ArtifactKind::CompanyInsights, &PromptBuilder::company_insights(company), &config)
            .await?;

        let mut insights = match self.coerce::<CompanyInsights>(&outcome.response.text) {
            Ok(insights) => insights,
            Err(GenerationError::Coercion(
                CoercionError::NoJson
                | CoercionError::InvalidJson(_)
                | CoercionError::MissingField { field: "text", .. },
            )) => {
                debug!("Company insights returned as prose");
                Coerced {
                    value: CompanyInsights {
                        text: outcome.response.text.trim().to_string(),
                        sources: Vec::new(),
                    },
                    defaulted: vec!["sources".to_string()],
                }
            }
            Err(e) => return Err(e),
        };

        insights.value.merge_sources(
            outcome
                .response
                .grounding_sources
                .iter()
                .map(|s| s.uri.as_str()),
        );
        self.note_degraded(ArtifactKind::CompanyInsights, &insights.defaulted);
        Ok(insights)
    }

    /// Usage accumulated since creation or the last reset.
    pub fn usage(&self) -> GenerationUsage {
        self.usage.get()
    }

    pub fn reset_usage(&self) {
        self.usage.reset();
    }

    fn base_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.settings.temperature),
            max_output_tokens: self.settings.max_output_tokens,
            ..Default::default()
        }
    }

    fn structured_config(&self, kind: ArtifactKind) -> GenerationConfig {
        GenerationConfig {
            response_schema: Some(kind.schema().clone()),
            json_response: true,
            ..self.base_config()
        }
    }

    async fn run<T: Artifact>(
        &self,
        prompt: Prompt,
        config: GenerationConfig,
    ) -> Result<Coerced<T>, GenerationError> {
        let outcome = self.call(T::KIND, &prompt, &config).await?;
        let coerced = self.coerce::<T>(&outcome.response.text)?;
        self.note_degraded(T::KIND, &coerced.defaulted);
        Ok(coerced)
    }

    async fn call(
        &self,
        kind: ArtifactKind,
        prompt: &Prompt,
        config: &GenerationConfig,
    ) -> Result<FallbackOutcome, GenerationError> {
        debug!(
            kind = %kind,
            system_chars = prompt.system_instruction.len(),
            content_chars = prompt.content.len(),
            estimated_tokens = self
                .fallback
                .client()
                .estimate_tokens(&prompt.content),
            "Built prompt"
        );

        let outcome = self
            .fallback
            .generate(Some(&prompt.system_instruction), &prompt.content, config)
            .await
            .inspect_err(|e| warn!(kind = %kind, error = %e, "Generation failed"))?;

        self.usage
            .record(&outcome.response.usage, outcome.attempts, outcome.used_fallback);
        debug!(
            kind = %kind,
            model = %outcome.response.model,
            used_fallback = outcome.used_fallback,
            total_tokens = outcome.response.usage.total(),
            "Model call complete"
        );
        Ok(outcome)
    }

    fn coerce<T: Artifact>(&self, raw: &str) -> Result<Coerced<T>, GenerationError> {
        let options = CoercionOptions {
            strict: self.settings.strict_validation,
        };
        coerce_with::<T>(raw, options).map_err(|e| {
            warn!(kind = %T::KIND, error = %e, "Model response could not be coerced");
            GenerationError::from(e)
        })
    }

    fn note_degraded(&self, kind: ArtifactKind, defaulted: &[String]) {
        if !defaulted.is_empty() {
            self.usage.record_degraded();
            warn!(kind = %kind, defaulted = ?defaulted, "Model response missing optional fields");
        }
    }
}

/// Builder for [`GenerationOrchestrator`].
pub struct GenerationOrchestratorBuilder {
    client: Option<Arc<dyn ModelClient>>,
    settings: GenerationSettings,
}

impl GenerationOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            settings: GenerationSettings::default(),
        }
    }

    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn primary_model(mut self, model: impl Into<String>) -> Self {
        self.settings.primary_model = model.into();
        self
    }

    pub fn fallback_model(mut self, model: Option<String>) -> Self {
        self.settings.fallback_model = model;
        self
    }

    pub fn build(self) -> Result<GenerationOrchestrator, GenerationError> {
        let client = self
            .client
            .ok_or_else(|| GenerationError::NotConfigured("No model client set".to_string()))?;

        if self.settings.primary_model.trim().is_empty() {
            return Err(GenerationError::NotConfigured(
                "Primary model must not be empty".to_string(),
            ));
        }

        Ok(GenerationOrchestrator::new(client, self.settings))
    }
}

impl Default for GenerationOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
