//! # jobhero-core
//!
//! Deterministic building blocks for JobHero's toolkit generation.
//!
//! This crate never talks to a model. It knows:
//! - what each generated artifact looks like ([`schema`], [`artifacts`])
//! - how to ask for it ([`prompts`])
//! - how to turn whatever text comes back into a typed value ([`coerce`])
//!
//! It also carries the small local utilities around generation: share links,
//! document export preparation and the one-time unlock entitlement.
//!
//! ## Example
//!
//! ```rust,ignore
//! use jobhero_core::{coerce, JobToolkit, PromptBuilder, UserInput};
//!
//! let prompt = PromptBuilder::toolkit(&input);
//! let raw = call_the_model(&prompt)?;
//! let toolkit = coerce::<JobToolkit>(&raw)?;
//!
//! if toolkit.is_degraded() {
//!     println!("defaulted: {:?}", toolkit.defaulted);
//! }
//! ```

#![recursion_limit = "256"]

pub mod artifacts;
pub mod coerce;
pub mod entitlement;
pub mod export;
pub mod profile;
pub mod prompts;
pub mod schema;
pub mod share;

use std::fmt;

use serde::{Deserialize, Serialize};

// Re-export main types at crate root
pub use artifacts::{
    BooleanSearchStrings, CareerRoadmap, ColdEmails, CompanyInsights, CompanyQuestions,
    EliteTools, InterviewFeedback, InterviewQuestion, JobToolkit, KeywordInsight,
    LinkedInContent, MockInterview, NetworkingScripts, ResumeAnalysis, RoadmapResource,
    RoadmapStep, ToolkitSection,
};
pub use coerce::{coerce, coerce_with, Artifact, Coerced, CoercionError, CoercionOptions};
pub use entitlement::{
    template_access, EntitlementError, EntitlementStore, FileEntitlementStore,
    MemoryEntitlementStore, ResumeTemplate, TemplateAccess,
};
pub use export::{DocumentKind, ExportDocument, LayoutOptions, Page};
pub use profile::{ProjectDetails, UserInput};
pub use prompts::{Prompt, PromptBuilder};
pub use schema::{validate_artifact, ArtifactKind};
pub use share::{ShareError, SharePayload};

/// Coarse classification shared by every generation failure.
///
/// Only [`ErrorKind::RateLimit`] is worth retrying against another model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network, auth or server failure
    Transport,
    /// Quota exhausted or model unavailable
    RateLimit,
    /// The call succeeded with no text
    EmptyResponse,
    /// Text came back but could not be turned into the artifact
    MalformedResponse,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::RateLimit)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Transport => "transport error",
            ErrorKind::RateLimit => "rate limited",
            ErrorKind::EmptyResponse => "empty response",
            ErrorKind::MalformedResponse => "malformed response",
        };
        f.write_str(s)
    }
}
