//! Generated artifacts.
//!
//! These are the typed shapes a model response is coerced into. All
//! optional sub-fields carry serde defaults so a partially generated
//! artifact still deserializes; see [`crate::coerce`] for the required
//! fields that are checked before that happens.

use serde::{Deserialize, Serialize};

/// A learning resource attached to a roadmap step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RoadmapResource {
    pub title: String,

    /// Category tag (Course, Book, Tool, Premium, ...)
    #[serde(rename = "type")]
    pub kind: String,
}

/// One phase of a career roadmap. Steps are ordered chronologically.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RoadmapStep {
    pub phase: String,
    pub duration: String,
    pub title: String,
    pub description: String,
    pub tools: Vec<String>,
    pub milestones: Vec<String>,
    pub resources: Vec<RoadmapResource>,
}

/// Wrapper returned by roadmap-only generations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CareerRoadmap {
    pub career_roadmap: Vec<RoadmapStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedInContent {
    pub headlines: Vec<String>,
    pub bio: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewQuestion {
    pub question: String,

    /// Why the question is asked (Technical, Behavioral, ...)
    pub context: String,

    /// Talking points and strategy
    pub feedback: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyQuestions {
    pub company: String,
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MockInterview {
    pub questions: Vec<InterviewQuestion>,
    pub company_specific: Vec<CompanyQuestions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ColdEmails {
    pub hiring_manager: String,
    pub peer_networking: String,
    pub value_proposition: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BooleanSearchStrings {
    pub hiring_managers: String,
    pub recruiters: String,
    pub peers: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkingScripts {
    pub connection_follow_up: String,
    pub informational_interview: String,
    pub re_engagement: String,
}

/// Paid "elite" extras. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EliteTools {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cold_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_negotiation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recruiter_psychology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevator_pitch: Option<String>,
    #[serde(rename = "plan90Day", skip_serializing_if = "Option::is_none")]
    pub plan_90_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_connection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_brand_audit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cold_emails: Option<ColdEmails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_search_strings: Option<BooleanSearchStrings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networking_scripts: Option<NetworkingScripts>,
}

impl EliteTools {
    /// Overlay the fields present in `other` onto `self`.
    fn overlay(&mut self, other: &EliteTools) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }

        take(&mut self.cold_email, &other.cold_email);
        take(&mut self.salary_negotiation, &other.salary_negotiation);
        take(&mut self.recruiter_psychology, &other.recruiter_psychology);
        take(&mut self.elevator_pitch, &other.elevator_pitch);
        take(&mut self.plan_90_day, &other.plan_90_day);
        take(&mut self.linkedin_connection, &other.linkedin_connection);
        take(&mut self.competitor_analysis, &other.competitor_analysis);
        take(&mut self.personal_brand_audit, &other.personal_brand_audit);
        take(&mut self.technical_challenge, &other.technical_challenge);
        take(&mut self.cold_emails, &other.cold_emails);
        take(&mut self.boolean_search_strings, &other.boolean_search_strings);
        take(&mut self.networking_scripts, &other.networking_scripts);
    }
}

/// The bundle produced by one toolkit generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct JobToolkit {
    pub resume: String,
    pub cover_letter: String,
    pub linkedin: LinkedInContent,
    pub mock_interview: MockInterview,
    pub career_roadmap: Vec<RoadmapStep>,

    #[serde(flatten)]
    pub elite: EliteTools,
}

/// Sections of a toolkit that can be copied as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolkitSection {
    Resume,
    CoverLetter,
    Linkedin,
    Interview,
    Elite,
}

impl JobToolkit {
    /// A new toolkit with the elite fields of `elite` layered on top.
    ///
    /// The original toolkit is left untouched.
    pub fn with_elite(&self, elite: &EliteTools) -> JobToolkit {
        let mut merged = self.clone();
        merged.elite.overlay(elite);
        merged
    }

    /// A new toolkit with its roadmap replaced.
    pub fn with_roadmap(&self, roadmap: Vec<RoadmapStep>) -> JobToolkit {
        JobToolkit {
            career_roadmap: roadmap,
            ..self.clone()
        }
    }

    /// Headline at `index`, wrapping around the available options.
    pub fn headline(&self, index: usize) -> &str {
        let headlines = &self.linkedin.headlines;
        if headlines.is_empty() {
            ""
        } else {
            &headlines[index % headlines.len()]
        }
    }

    /// Plain-text rendering of a section for the clipboard.
    ///
    /// `active_headline` selects which LinkedIn headline is shown; the
    /// toolkit itself is not modified.
    pub fn copy_text(&self, section: ToolkitSection, active_headline: usize) -> String {
        match section {
            ToolkitSection::Resume => self.resume.clone(),
            ToolkitSection::CoverLetter => self.cover_letter.clone(),
            ToolkitSection::Linkedin => {
                format!("{}\n\n{}", self.headline(active_headline), self.linkedin.bio)
            }
            ToolkitSection::Interview => self
                .mock_interview
                .questions
                .iter()
                .map(|q| q.question.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            ToolkitSection::Elite => format!(
                "{}\n\n{}",
                self.elite.cold_email.as_deref().unwrap_or_default(),
                self.elite.salary_negotiation.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// A keyword the audited resume is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct KeywordInsight {
    pub keyword: String,

    /// Domain or category of the keyword
    pub context: String,
    pub reason: String,
    pub integration_tip: String,
}

/// Resume audit result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeAnalysis {
    /// 0-100
    pub score: f64,
    pub summary: String,
    pub missing_keywords: Vec<KeywordInsight>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Feedback on one mock-interview answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewFeedback {
    /// 1-10
    pub rating: f64,
    pub clarity_score: f64,
    pub relevance_score: f64,
    pub delivery_score: f64,
    pub clarity: String,
    pub relevance: String,
    pub delivery: String,
    pub missing_points: Vec<String>,
    pub sample_answer: String,
}

/// Company research summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInsights {
    pub text: String,
    pub sources: Vec<String>,
}

impl CompanyInsights {
    /// Append grounding URLs not already listed, keeping order.
    pub fn merge_sources<'a>(&mut self, uris: impl IntoIterator<Item = &'a str>) {
        for uri in uris {
            if !uri.is_empty() && !self.sources.iter().any(|s| s == uri) {
                self.sources.push(uri.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolkit() -> JobToolkit {
        JobToolkit {
            resume: "RESUME".to_string(),
            linkedin: LinkedInContent {
                headlines: vec!["First".to_string(), "Second".to_string()],
                bio: "Bio".to_string(),
            },
            elite: EliteTools {
                cold_email: Some("Old email".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_elite_fields_flatten_into_toolkit() {
        let json = r#"{"resume": "R", "salaryNegotiation": "Ask for more", "plan90Day": "Plan"}"#;
        let toolkit: JobToolkit = serde_json::from_str(json).unwrap();

        assert_eq!(toolkit.elite.salary_negotiation.as_deref(), Some("Ask for more"));
        assert_eq!(toolkit.elite.plan_90_day.as_deref(), Some("Plan"));
        assert!(toolkit.elite.cold_email.is_none());
    }

    #[test]
    fn test_with_elite_does_not_touch_original() {
        let original = toolkit();
        let elite = EliteTools {
            salary_negotiation: Some("Script".to_string()),
            ..Default::default()
        };

        let merged = original.with_elite(&elite);

        assert_eq!(merged.elite.salary_negotiation.as_deref(), Some("Script"));
        assert_eq!(merged.elite.cold_email.as_deref(), Some("Old email"));
        assert!(original.elite.salary_negotiation.is_none());
    }

    #[test]
    fn test_copy_text_uses_selected_headline() {
        let toolkit = toolkit();

        assert_eq!(toolkit.copy_text(ToolkitSection::Linkedin, 1), "Second\n\nBio");
        assert_eq!(toolkit.copy_text(ToolkitSection::Linkedin, 2), "First\n\nBio");
        assert_eq!(toolkit.linkedin.headlines[0], "First");
    }

    #[test]
    fn test_headline_without_options_is_empty() {
        assert_eq!(JobToolkit::default().headline(3), "");
    }

    #[test]
    fn test_merge_sources_dedups() {
        let mut insights = CompanyInsights {
            text: "Acme builds rockets".to_string(),
            sources: vec!["https://a.example".to_string()],
        };

        insights.merge_sources(["https://a.example", "", "https://b.example"]);

        assert_eq!(insights.sources, vec!["https://a.example", "https://b.example"]);
    }
}
