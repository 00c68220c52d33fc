//! Schema registry for generated artifacts.
//!
//! Each artifact kind has a JSON Schema (sent to the model as the
//! response-format hint), a list of required fields, and a list of
//! optional fields with the safe default substituted when the model
//! leaves them out.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The kinds of artifact the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    JobToolkit,
    CareerRoadmap,
    ResumeAnalysis,
    InterviewFeedback,
    ProfileExtraction,
    EliteTools,
    CompanyInsights,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 7] = [
        ArtifactKind::JobToolkit,
        ArtifactKind::CareerRoadmap,
        ArtifactKind::ResumeAnalysis,
        ArtifactKind::InterviewFeedback,
        ArtifactKind::ProfileExtraction,
        ArtifactKind::EliteTools,
        ArtifactKind::CompanyInsights,
    ];

    /// JSON Schema describing the expected response.
    pub fn schema(self) -> &'static Value {
        match self {
            ArtifactKind::JobToolkit => &JOB_TOOLKIT_SCHEMA,
            ArtifactKind::CareerRoadmap => &CAREER_ROADMAP_SCHEMA,
            ArtifactKind::ResumeAnalysis => &RESUME_ANALYSIS_SCHEMA,
            ArtifactKind::InterviewFeedback => &INTERVIEW_FEEDBACK_SCHEMA,
            ArtifactKind::ProfileExtraction => &PROFILE_EXTRACTION_SCHEMA,
            ArtifactKind::EliteTools => &ELITE_TOOLS_SCHEMA,
            ArtifactKind::CompanyInsights => &COMPANY_INSIGHTS_SCHEMA,
        }
    }

    /// Top-level fields that must be present (and not null).
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ArtifactKind::JobToolkit => &["resume"],
            ArtifactKind::CareerRoadmap => &["careerRoadmap"],
            ArtifactKind::ResumeAnalysis => &["score"],
            ArtifactKind::InterviewFeedback => &["rating"],
            ArtifactKind::CompanyInsights => &["text"],
            ArtifactKind::ProfileExtraction | ArtifactKind::EliteTools => &[],
        }
    }

    /// Optional field paths and their defaults.
    ///
    /// Paths are dot separated. A parent always appears before its
    /// children so a defaulted parent object gets its children filled in.
    pub fn optional_defaults(self) -> Vec<(&'static str, Value)> {
        match self {
            ArtifactKind::JobToolkit => vec![
                ("coverLetter", json!("")),
                ("linkedin", json!({})),
                ("linkedin.headlines", json!([])),
                ("linkedin.bio", json!("")),
                ("mockInterview", json!({})),
                ("mockInterview.questions", json!([])),
                ("careerRoadmap", json!([])),
            ],
            ArtifactKind::ResumeAnalysis => vec![
                ("summary", json!("")),
                ("missingKeywords", json!([])),
                ("strengths", json!([])),
                ("improvements", json!([])),
            ],
            ArtifactKind::InterviewFeedback => vec![
                ("clarity", json!("")),
                ("relevance", json!("")),
                ("missingPoints", json!([])),
                ("sampleAnswer", json!("")),
            ],
            ArtifactKind::CompanyInsights => vec![("sources", json!([]))],
            ArtifactKind::CareerRoadmap
            | ArtifactKind::ProfileExtraction
            | ArtifactKind::EliteTools => Vec::new(),
        }
    }

    /// Whether a bare JSON array is an acceptable response.
    ///
    /// Only roadmap generations may answer with just the list of steps.
    pub fn accepts_bare_array(self) -> bool {
        matches!(self, ArtifactKind::CareerRoadmap)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::JobToolkit => "job_toolkit",
            ArtifactKind::CareerRoadmap => "career_roadmap",
            ArtifactKind::ResumeAnalysis => "resume_analysis",
            ArtifactKind::InterviewFeedback => "interview_feedback",
            ArtifactKind::ProfileExtraction => "profile_extraction",
            ArtifactKind::EliteTools => "elite_tools",
            ArtifactKind::CompanyInsights => "company_insights",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    static ref STRING_LIST: Value = json!({ "type": "array", "items": { "type": "string" } });

    static ref ROADMAP_STEP_SCHEMA: Value = json!({
        "type": "object",
        "properties": {
            "phase": { "type": "string" },
            "duration": { "type": "string" },
            "title": { "type": "string" },
            "description": { "type": "string" },
            "tools": *STRING_LIST,
            "milestones": *STRING_LIST,
            "resources": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "type": { "type": "string" }
                    },
                    "required": ["title", "type"]
                }
            }
        },
        "required": ["phase", "duration", "title", "description", "tools", "milestones", "resources"]
    });

    static ref INTERVIEW_QUESTION_SCHEMA: Value = json!({
        "type": "object",
        "properties": {
            "question": { "type": "string" },
            "context": { "type": "string" },
            "feedback": { "type": "string" }
        },
        "required": ["question", "context", "feedback"]
    });

    static ref ELITE_PROPERTIES: Value = json!({
        "coldEmail": { "type": "string" },
        "salaryNegotiation": { "type": "string" },
        "recruiterPsychology": { "type": "string" },
        "elevatorPitch": { "type": "string" },
        "plan90Day": { "type": "string" },
        "linkedinConnection": { "type": "string" },
        "competitorAnalysis": { "type": "string" },
        "personalBrandAudit": { "type": "string" },
        "technicalChallenge": { "type": "string" },
        "coldEmails": {
            "type": "object",
            "properties": {
                "hiringManager": { "type": "string" },
                "peerNetworking": { "type": "string" },
                "valueProposition": { "type": "string" }
            }
        },
        "booleanSearchStrings": {
            "type": "object",
            "properties": {
                "hiringManagers": { "type": "string" },
                "recruiters": { "type": "string" },
                "peers": { "type": "string" }
            }
        },
        "networkingScripts": {
            "type": "object",
            "properties": {
                "connectionFollowUp": { "type": "string" },
                "informationalInterview": { "type": "string" },
                "reEngagement": { "type": "string" }
            }
        }
    });

    static ref JOB_TOOLKIT_SCHEMA: Value = {
        let mut properties = json!({
            "resume": { "type": "string" },
            "coverLetter": { "type": "string" },
            "linkedin": {
                "type": "object",
                "properties": {
                    "headlines": *STRING_LIST,
                    "bio": { "type": "string" }
                },
                "required": ["headlines", "bio"]
            },
            "mockInterview": {
                "type": "object",
                "properties": {
                    "questions": { "type": "array", "items": *INTERVIEW_QUESTION_SCHEMA },
                    "companySpecific": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "company": { "type": "string" },
                                "questions": { "type": "array", "items": *INTERVIEW_QUESTION_SCHEMA }
                            }
                        }
                    }
                },
                "required": ["questions"]
            },
            "careerRoadmap": { "type": "array", "items": *ROADMAP_STEP_SCHEMA }
        });
        if let (Some(target), Some(extra)) = (properties.as_object_mut(), ELITE_PROPERTIES.as_object()) {
            target.extend(extra.clone());
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": ["resume", "coverLetter", "linkedin", "mockInterview", "careerRoadmap"]
        })
    };

    static ref CAREER_ROADMAP_SCHEMA: Value = json!({
        "type": "object",
        "properties": {
            "careerRoadmap": { "type": "array", "items": *ROADMAP_STEP_SCHEMA }
        },
        "required": ["careerRoadmap"]
    });

    static ref RESUME_ANALYSIS_SCHEMA: Value = json!({
        "type": "object",
        "properties": {
            "score": { "type": "number", "minimum": 0, "maximum": 100 },
            "summary": { "type": "string" },
            "strengths": *STRING_LIST,
            "improvements": *STRING_LIST,
            "missingKeywords": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "keyword": { "type": "string" },
                        "context": { "type": "string" },
                        "reason": { "type": "string" },
                        "integrationTip": { "type": "string" }
                    },
                    "required": ["keyword", "context", "reason", "integrationTip"]
                }
            }
        },
        "required": ["score", "summary", "strengths", "improvements", "missingKeywords"]
    });

    static ref INTERVIEW_FEEDBACK_SCHEMA: Value = json!({
        "type": "object",
        "properties": {
            "rating": { "type": "number", "minimum": 1, "maximum": 10 },
            "clarityScore": { "type": "number" },
            "relevanceScore": { "type": "number" },
            "deliveryScore": { "type": "number" },
            "clarity": { "type": "string" },
            "relevance": { "type": "string" },
            "delivery": { "type": "string" },
            "missingPoints": *STRING_LIST,
            "sampleAnswer": { "type": "string" }
        },
        "required": ["rating", "clarity", "relevance", "missingPoints", "sampleAnswer"]
    });

    static ref PROFILE_EXTRACTION_SCHEMA: Value = json!({
        "type": "object",
        "properties": {
            "fullName": { "type": "string" },
            "email": { "type": "string" },
            "phone": { "type": "string" },
            "linkedinGithub": { "type": "string" },
            "careerObjective": { "type": "string" },
            "education": { "type": "string" },
            "skills": { "type": "string" },
            "projects": { "type": "string" },
            "internships": { "type": "string" },
            "eventsAndCertifications": { "type": "string" },
            "yearsOfExperience": { "type": "string" },
            "jobRoleTarget": { "type": "string" },
            "company": { "type": "string" },
            "whyThisRole": { "type": "string" },
            "interests": { "type": "string" },
            "currentYear": { "type": "string" },
            "school12th": { "type": "string" },
            "school10th": { "type": "string" },
            "previousDegree": { "type": "string" },
            "previousDegreeScore": { "type": "string" },
            "otherInfo": { "type": "string" },
            "projectsList": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "link": { "type": "string" },
                        "startDate": { "type": "string" },
                        "endDate": { "type": "string" },
                        "description": { "type": "string" }
                    }
                }
            }
        }
    });

    static ref ELITE_TOOLS_SCHEMA: Value = json!({
        "type": "object",
        "properties": *ELITE_PROPERTIES
    });

    static ref COMPANY_INSIGHTS_SCHEMA: Value = json!({
        "type": "object",
        "properties": {
            "text": { "type": "string" },
            "sources": *STRING_LIST
        },
        "required": ["text"]
    });
}

/// Compiled validators (initialized once, reused).
static COMPILED: OnceLock<BTreeMap<ArtifactKind, Result<jsonschema::Validator, String>>> =
    OnceLock::new();

fn validators() -> &'static BTreeMap<ArtifactKind, Result<jsonschema::Validator, String>> {
    COMPILED.get_or_init(|| {
        ArtifactKind::ALL
            .iter()
            .map(|kind| {
                let compiled = jsonschema::options()
                    .build(kind.schema())
                    .map_err(|e| format!("Failed to compile {} schema: {}", kind, e));
                (*kind, compiled)
            })
            .collect()
    })
}

/// Validate a parsed artifact against its schema.
///
/// Returns every violation found, formatted with its instance path.
pub fn validate_artifact(kind: ArtifactKind, value: &Value) -> Result<(), Vec<String>> {
    let validator = match validators().get(&kind) {
        Some(Ok(v)) => v,
        Some(Err(e)) => return Err(vec![e.clone()]),
        None => return Err(vec![format!("No schema registered for {}", kind)]),
    };

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
