use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{Certification, Project, SemesterGrade};

/// Every profile write goes through this schema; unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileInput {
    pub clerk_user_id: Option<String>,
    pub roll_number: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub branch: Option<String>,
    pub year: Option<i16>,
    pub cgpa: Option<f64>,
    pub semester_grades: Option<Vec<SemesterGrade>>,
    pub tenth_percentage: Option<f64>,
    pub twelfth_percentage: Option<f64>,
    pub projects: Option<Vec<Project>>,
    pub certifications: Option<Vec<Certification>>,
    pub skills: Option<Vec<String>>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub resume_url: Option<String>,
    pub marks_memo_url: Option<String>,
    pub institution_id: Option<Uuid>,
    pub is_onboarding_complete: Option<bool>,
}

/// Accepted shapes for externally hosted documents (resume, marks memo).
/// The link is never resolved; only its shape is checked.
static DOCUMENT_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^https://drive\.google\.com/file/d/[A-Za-z0-9_-]+/view(\?[^\s]*)?$",
        r"^https://drive\.google\.com/open\?id=[A-Za-z0-9_-]+$",
        r"^https://docs\.google\.com/document/d/[A-Za-z0-9_-]+(/[^\s]*)?$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("document URL pattern must compile"))
    .collect()
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

static LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://\S+$").expect("link pattern must compile"));

pub fn is_valid_document_url(url: &str) -> bool {
    DOCUMENT_URL_PATTERNS.iter().any(|re| re.is_match(url))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Returns the trimmed identity id, or a validation error when it is missing.
pub fn require_identity(input: &ProfileInput) -> Result<String, AppError> {
    input
        .clerk_user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| AppError::Validation("clerkUserId is required".to_string()))
}

/// Checks every present field and reports all failures at once.
pub fn validate_profile_input(input: &ProfileInput) -> Result<(), AppError> {
    let mut errors: Vec<String> = Vec::new();

    if let Some(roll) = &input.roll_number {
        if roll.trim().is_empty() {
            errors.push("rollNumber cannot be blank".to_string());
        }
    }
    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            errors.push("name cannot be blank".to_string());
        }
    }
    if let Some(email) = &input.email {
        if !is_valid_email(email.trim()) {
            errors.push(format!("email '{email}' is not a valid email address"));
        }
    }
    if let Some(phone) = &input.phone {
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
        let allowed = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' '));
        if !allowed || !(10..=15).contains(&digits) {
            errors.push("phone must contain 10 to 15 digits".to_string());
        }
    }
    if let Some(year) = input.year {
        if !(1..=5).contains(&year) {
            errors.push("year must be between 1 and 5".to_string());
        }
    }
    if let Some(cgpa) = input.cgpa {
        if !(0.0..=10.0).contains(&cgpa) {
            errors.push("cgpa must be between 0 and 10".to_string());
        }
    }
    for (field, value) in [
        ("tenthPercentage", input.tenth_percentage),
        ("twelfthPercentage", input.twelfth_percentage),
    ] {
        if let Some(pct) = value {
            if !(0.0..=100.0).contains(&pct) {
                errors.push(format!("{field} must be between 0 and 100"));
            }
        }
    }
    for grade in input.semester_grades.iter().flatten() {
        if !(1..=10).contains(&grade.semester) {
            errors.push(format!("semester {} is out of range 1-10", grade.semester));
        }
        if !(0.0..=10.0).contains(&grade.sgpa) {
            errors.push(format!(
                "sgpa for semester {} must be between 0 and 10",
                grade.semester
            ));
        }
    }
    for project in input.projects.iter().flatten() {
        if project.title.trim().is_empty() {
            errors.push("project title cannot be blank".to_string());
        }
        if let Some(link) = project.link.as_deref().filter(|l| !l.is_empty()) {
            if !LINK_PATTERN.is_match(link) {
                errors.push(format!("project link '{link}' must be an http(s) URL"));
            }
        }
    }
    for cert in input.certifications.iter().flatten() {
        if cert.name.trim().is_empty() {
            errors.push("certification name cannot be blank".to_string());
        }
    }
    for (field, value) in [
        ("linkedinUrl", &input.linkedin_url),
        ("githubUrl", &input.github_url),
    ] {
        if let Some(link) = value.as_deref().filter(|l| !l.is_empty()) {
            if !LINK_PATTERN.is_match(link) {
                errors.push(format!("{field} must be an http(s) URL"));
            }
        }
    }
    for (field, value) in [
        ("resumeUrl", &input.resume_url),
        ("marksMemoUrl", &input.marks_memo_url),
    ] {
        // empty string clears the link
        if let Some(url) = value.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            if !is_valid_document_url(url) {
                errors.push(format!(
                    "{field} must be a Google Drive or Google Docs share link"
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}
