use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SemesterGrade {
    pub semester: u8,
    pub sgpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub issued_on: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// A student's placement profile, keyed by the identity provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub clerk_user_id: String,
    pub roll_number: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub branch: Option<String>,
    pub year: Option<i16>,
    pub cgpa: Option<f64>,
    pub semester_grades: Json<Vec<SemesterGrade>>,
    pub tenth_percentage: Option<f64>,
    pub twelfth_percentage: Option<f64>,
    pub projects: Json<Vec<Project>>,
    pub certifications: Json<Vec<Certification>>,
    pub skills: Vec<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub resume_url: Option<String>,
    pub marks_memo_url: Option<String>,
    pub institution_id: Option<Uuid>,
    pub is_onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// An empty profile for `clerk_user_id`, not yet persisted.
    pub fn new(clerk_user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            clerk_user_id: clerk_user_id.to_string(),
            roll_number: None,
            name: None,
            email: None,
            phone: None,
            branch: None,
            year: None,
            cgpa: None,
            semester_grades: Json(Vec::new()),
            tenth_percentage: None,
            twelfth_percentage: None,
            projects: Json(Vec::new()),
            certifications: Json(Vec::new()),
            skills: Vec::new(),
            linkedin_url: None,
            github_url: None,
            resume_url: None,
            marks_memo_url: None,
            institution_id: None,
            is_onboarding_complete: false,
            created_at: now,
            updated_at: now,
        }
    }
}
