//! Storage client: the one seam through which every component reaches
//! persisted records.
//!
//! `AppState` carries an `Arc<dyn Store>`: `PgStore` in production,
//! `MemoryStore` for local development and tests. Both backends enforce the
//! same unique keys and report collisions as `StoreError::Duplicate`, which
//! the error layer turns into field-specific conflicts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::institution::Institution;
use crate::models::job::{Application, ApplicationStatus, Job};
use crate::models::profile::UserProfile;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Unique keys the storage layer enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    IdentityId,
    RollNumber,
    Application,
    InstitutionCode,
}

impl UniqueKey {
    /// The request field that collided, as the client spells it.
    pub fn field(&self) -> &'static str {
        match self {
            UniqueKey::IdentityId => "clerkUserId",
            UniqueKey::RollNumber => "rollNumber",
            UniqueKey::Application => "jobId",
            UniqueKey::InstitutionCode => "code",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique key {0:?}")]
    Duplicate(UniqueKey),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                if let Some(key) = db_err.constraint().and_then(unique_key_for_constraint) {
                    return StoreError::Duplicate(key);
                }
            }
        }
        StoreError::Database(err)
    }
}

/// Maps constraint names from `migrations/` onto unique keys.
fn unique_key_for_constraint(constraint: &str) -> Option<UniqueKey> {
    match constraint {
        "user_profiles_clerk_user_id_key" => Some(UniqueKey::IdentityId),
        "user_profiles_roll_number_key" => Some(UniqueKey::RollNumber),
        "applications_student_job_key" => Some(UniqueKey::Application),
        "institutions_code_key" => Some(UniqueKey::InstitutionCode),
        _ => None,
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    // Profiles
    async fn find_profile(&self, clerk_user_id: &str) -> StoreResult<Option<UserProfile>>;
    async fn find_profile_by_roll_number(
        &self,
        roll_number: &str,
    ) -> StoreResult<Option<UserProfile>>;
    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile>;
    /// Overwrites the profile stored under `profile.clerk_user_id`.
    async fn update_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile>;

    // Institutions
    async fn insert_institution(&self, institution: &Institution) -> StoreResult<Institution>;
    async fn find_institution(&self, id: Uuid) -> StoreResult<Option<Institution>>;
    async fn list_institutions(&self) -> StoreResult<Vec<Institution>>;
    async fn update_institution(&self, institution: &Institution) -> StoreResult<Institution>;

    // Jobs
    async fn insert_job(&self, job: &Job) -> StoreResult<Job>;
    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>>;
    async fn list_jobs(&self) -> StoreResult<Vec<Job>>;
    /// Active postings whose deadline is not before `now`.
    async fn list_open_jobs(&self, now: DateTime<Utc>) -> StoreResult<Vec<Job>>;

    // Applications
    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>>;
    async fn find_application_for(
        &self,
        student_id: &str,
        job_id: Uuid,
    ) -> StoreResult<Option<Application>>;
    async fn insert_application(&self, application: &Application) -> StoreResult<Application>;
    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Application>>;
    async fn list_applications_for_student(
        &self,
        student_id: &str,
    ) -> StoreResult<Vec<Application>>;
    async fn list_applications_for_job(&self, job_id: Uuid) -> StoreResult<Vec<Application>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_names_map_to_unique_keys() {
        let cases = [
            ("user_profiles_clerk_user_id_key", UniqueKey::IdentityId),
            ("user_profiles_roll_number_key", UniqueKey::RollNumber),
            ("applications_student_job_key", UniqueKey::Application),
            ("institutions_code_key", UniqueKey::InstitutionCode),
        ];
        for (constraint, key) in cases {
            assert_eq!(unique_key_for_constraint(constraint), Some(key));
        }
    }

    #[test]
    fn test_constraint_names_exist_in_schema() {
        let schema = include_str!("../../migrations/0001_init.sql");
        for constraint in [
            "user_profiles_clerk_user_id_key",
            "user_profiles_roll_number_key",
            "applications_student_job_key",
            "institutions_code_key",
        ] {
            assert!(schema.contains(constraint), "{constraint} missing from schema");
        }
    }

    #[test]
    fn test_unknown_constraint_is_unmapped() {
        assert_eq!(unique_key_for_constraint("jobs_pkey"), None);
        assert_eq!(unique_key_for_constraint(""), None);
    }

    #[test]
    fn test_key_fields_match_request_names() {
        assert_eq!(UniqueKey::RollNumber.field(), "rollNumber");
        assert_eq!(UniqueKey::Application.field(), "jobId");
    }
}
