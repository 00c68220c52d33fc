//! Job seeker profile.
//!
//! Every field is plain text. Nothing is required: absent fields
//! deserialize to empty strings and are passed through to the model
//! as-is.

use serde::{Deserialize, Serialize};

/// A structured project entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDetails {
    pub id: String,
    pub name: String,
    pub link: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

/// The profile collected from the job seeker.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_github: String,
    pub career_objective: String,
    pub education: String,
    pub skills: String,

    /// Free-text projects (older profiles)
    pub projects: String,

    /// Structured projects
    pub projects_list: Vec<ProjectDetails>,

    pub internships: String,
    pub events_and_certifications: String,
    pub years_of_experience: String,
    pub job_role_target: String,
    pub company: String,
    pub why_this_role: String,
    pub interests: String,
    pub current_year: String,

    #[serde(rename = "school12th")]
    pub school_12th: String,
    #[serde(rename = "school10th")]
    pub school_10th: String,

    pub previous_degree: String,
    pub previous_degree_score: String,
    pub other_info: String,
}

impl UserInput {
    /// Labelled scalar fields in the order they are shown to the model.
    pub fn labelled_fields(&self) -> [(&'static str, &str); 21] {
        [
            ("Full Name", &self.full_name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("LinkedIn / GitHub", &self.linkedin_github),
            ("Career Objective", &self.career_objective),
            ("Education", &self.education),
            ("Previous Degree", &self.previous_degree),
            ("Previous Degree Score", &self.previous_degree_score),
            ("Class 12", &self.school_12th),
            ("Class 10", &self.school_10th),
            ("Current Year", &self.current_year),
            ("Skills", &self.skills),
            ("Projects", &self.projects),
            ("Internships / Experience", &self.internships),
            ("Events & Certifications", &self.events_and_certifications),
            ("Years of Experience", &self.years_of_experience),
            ("Interests", &self.interests),
            ("Other Information", &self.other_info),
            ("Target Role", &self.job_role_target),
            ("Target Company", &self.company),
            ("Motivation", &self.why_this_role),
        ]
    }

    /// Fill empty fields of `self` from `other`. Non-empty fields win.
    ///
    /// Used when a profile extracted from pasted text is applied on top
    /// of what the user already typed.
    pub fn fill_missing_from(&mut self, other: &UserInput) {
        fn fill(dst: &mut String, src: &str) {
            if dst.trim().is_empty() && !src.trim().is_empty() {
                *dst = src.to_string();
            }
        }

        fill(&mut self.full_name, &other.full_name);
        fill(&mut self.email, &other.email);
        fill(&mut self.phone, &other.phone);
        fill(&mut self.linkedin_github, &other.linkedin_github);
        fill(&mut self.career_objective, &other.career_objective);
        fill(&mut self.education, &other.education);
        fill(&mut self.skills, &other.skills);
        fill(&mut self.projects, &other.projects);
        fill(&mut self.internships, &other.internships);
        fill(&mut self.events_and_certifications, &other.events_and_certifications);
        fill(&mut self.years_of_experience, &other.years_of_experience);
        fill(&mut self.job_role_target, &other.job_role_target);
        fill(&mut self.company, &other.company);
        fill(&mut self.why_this_role, &other.why_this_role);
        fill(&mut self.interests, &other.interests);
        fill(&mut self.current_year, &other.current_year);
        fill(&mut self.school_12th, &other.school_12th);
        fill(&mut self.school_10th, &other.school_10th);
        fill(&mut self.previous_degree, &other.previous_degree);
        fill(&mut self.previous_degree_score, &other.previous_degree_score);
        fill(&mut self.other_info, &other.other_info);

        if self.projects_list.is_empty() {
            self.projects_list = other.projects_list.clone();
        }
    }
}
