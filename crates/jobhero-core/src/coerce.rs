//! Response coercion: raw model text to typed artifacts.
//!
//! 1. Extraction: find the first balanced JSON object (or array, for
//!    roadmap-only responses) in the text, skipping markdown fences and
//!    surrounding prose.
//! 2. Parse: parse the extracted slice as JSON.
//! 3. Defaulting: fill in known optional fields the model left out and
//!    record which ones were filled.
//!
//! A response missing a required field, or carrying the wrong primitive
//! type under a known field, is rejected as malformed.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::artifacts::{
    CareerRoadmap, CompanyInsights, EliteTools, InterviewFeedback, JobToolkit, ResumeAnalysis,
};
use crate::profile::UserInput;
use crate::schema::{validate_artifact, ArtifactKind};
use crate::ErrorKind;

/// Errors from response coercion. All of them are malformed responses.
#[derive(Error, Debug)]
pub enum CoercionError {
    #[error("No JSON object found in model response")]
    NoJson,

    #[error("Model response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Expected a JSON {expected} for {kind}")]
    UnexpectedShape {
        kind: ArtifactKind,
        expected: &'static str,
    },

    #[error("Missing required field '{field}' in {kind}")]
    MissingField {
        kind: ArtifactKind,
        field: &'static str,
    },

    #[error("Response does not match the {kind} schema: {}", .errors.join("; "))]
    Schema {
        kind: ArtifactKind,
        errors: Vec<String>,
    },

    #[error("Response fields have unexpected types: {0}")]
    TypeMismatch(#[source] serde_json::Error),
}

impl CoercionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedResponse
    }
}

/// A typed artifact the coercer can produce.
pub trait Artifact: DeserializeOwned {
    const KIND: ArtifactKind;

    /// Post-deserialization cleanup (range clamping and the like).
    fn normalize(&mut self) {}
}

impl Artifact for JobToolkit {
    const KIND: ArtifactKind = ArtifactKind::JobToolkit;
}

impl Artifact for CareerRoadmap {
    const KIND: ArtifactKind = ArtifactKind::CareerRoadmap;
}

impl Artifact for ResumeAnalysis {
    const KIND: ArtifactKind = ArtifactKind::ResumeAnalysis;

    fn normalize(&mut self) {
        self.score = self.score.clamp(0.0, 100.0);
    }
}

impl Artifact for InterviewFeedback {
    const KIND: ArtifactKind = ArtifactKind::InterviewFeedback;

    fn normalize(&mut self) {
        self.rating = self.rating.clamp(1.0, 10.0);
        for score in [
            &mut self.clarity_score,
            &mut self.relevance_score,
            &mut self.delivery_score,
        ] {
            *score = score.clamp(0.0, 10.0);
        }
    }
}

impl Artifact for UserInput {
    const KIND: ArtifactKind = ArtifactKind::ProfileExtraction;
}

impl Artifact for EliteTools {
    const KIND: ArtifactKind = ArtifactKind::EliteTools;
}

impl Artifact for CompanyInsights {
    const KIND: ArtifactKind = ArtifactKind::CompanyInsights;
}

/// A coerced artifact plus the optional fields that had to be defaulted.
///
/// Callers that care whether the model returned everything check
/// [`Coerced::is_degraded`] instead of assuming a complete response.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced<T> {
    pub value: T,

    /// Paths (dot separated) filled with defaults
    pub defaulted: Vec<String>,
}

impl<T> Coerced<T> {
    pub fn is_degraded(&self) -> bool {
        !self.defaulted.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Coerced<U> {
        Coerced {
            value: f(self.value),
            defaulted: self.defaulted,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Coercion options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoercionOptions {
    /// Also validate the defaulted value against the artifact's JSON Schema.
    pub strict: bool,
}

/// Coerce raw model text into `T` with lenient options.
pub fn coerce<T: Artifact>(raw: &str) -> Result<Coerced<T>, CoercionError> {
    coerce_with(raw, CoercionOptions::default())
}

/// Coerce raw model text into `T`.
pub fn coerce_with<T: Artifact>(
    raw: &str,
    options: CoercionOptions,
) -> Result<Coerced<T>, CoercionError> {
    let kind = T::KIND;
    let mut value = parse_json(raw, kind.accepts_bare_array())?;

    if kind.accepts_bare_array() && value.is_array() {
        let mut wrapper = Map::new();
        wrapper.insert("careerRoadmap".to_string(), value);
        value = Value::Object(wrapper);
    }

    if !value.is_object() {
        return Err(CoercionError::UnexpectedShape {
            kind,
            expected: "object",
        });
    }

    promote_legacy_fields(kind, &mut value);

    for field in kind.required_fields() {
        if value.get(*field).map_or(true, Value::is_null) {
            return Err(CoercionError::MissingField { kind, field });
        }
    }

    let defaulted = apply_defaults(kind, &mut value);
    if !defaulted.is_empty() {
        debug!(kind = %kind, defaulted = ?defaulted, "Filled missing optional fields");
    }

    if options.strict {
        validate_artifact(kind, &value).map_err(|errors| CoercionError::Schema { kind, errors })?;
    }

    let mut artifact: T = serde_json::from_value(value).map_err(CoercionError::TypeMismatch)?;
    artifact.normalize();

    Ok(Coerced {
        value: artifact,
        defaulted,
    })
}

/// Find the first top-level balanced JSON object (or array) in `raw`.
///
/// Braces inside string literals are ignored. Returns `NoJson` when there
/// is no opening delimiter, or when the first one is never closed
/// (truncated output): anything after an unclosed opener is nested in it.
pub fn extract_json(raw: &str, allow_array: bool) -> Result<&str, CoercionError> {
    let bytes = raw.as_bytes();
    let start = bytes
        .iter()
        .position(|&b| b == b'{' || (allow_array && b == b'['))
        .ok_or(CoercionError::NoJson)?;
    let end = balanced_end(bytes, start).ok_or(CoercionError::NoJson)?;
    Ok(&raw[start..=end])
}

/// Extract and parse the first top-level JSON value.
///
/// Values nested inside a span that fails to parse are never tried on
/// their own.
pub fn parse_json(raw: &str, allow_array: bool) -> Result<Value, CoercionError> {
    let json = extract_json(raw, allow_array)?;
    serde_json::from_str(json).map_err(CoercionError::InvalidJson)
}

/// Index of the delimiter closing the one at `start`, if any.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Rewrite older field spellings into the canonical schema.
fn promote_legacy_fields(kind: ArtifactKind, value: &mut Value) {
    if kind != ArtifactKind::JobToolkit {
        return;
    }

    // {"linkedin": {"headline": "..."}} -> {"linkedin": {"headlines": ["..."]}}
    if let Some(linkedin) = value.get_mut("linkedin").and_then(Value::as_object_mut) {
        let has_list = linkedin.get("headlines").is_some_and(|v| !v.is_null());
        if !has_list {
            if let Some(Value::String(headline)) = linkedin.remove("headline") {
                linkedin.insert("headlines".to_string(), Value::Array(vec![Value::String(headline)]));
            }
        }
    }
}

/// Insert defaults for absent or null optional fields.
fn apply_defaults(kind: ArtifactKind, value: &mut Value) -> Vec<String> {
    let mut defaulted = Vec::new();

    for (path, default) in kind.optional_defaults() {
        let (parent_path, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (Some(parent), key),
            None => (None, path),
        };

        let parent = match parent_path {
            Some(parent_path) => parent_path
                .split('.')
                .try_fold(&mut *value, |node, segment| node.get_mut(segment)),
            None => Some(&mut *value),
        };

        let Some(object) = parent.and_then(Value::as_object_mut) else {
            continue;
        };

        if object.get(key).map_or(true, Value::is_null) {
            object.insert(key.to_string(), default);
            defaulted.push(path.to_string());
        }
    }

    defaulted
}
