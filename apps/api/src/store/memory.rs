use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, UniqueKey};
use crate::models::institution::Institution;
use crate::models::job::{Application, ApplicationStatus, Job};
use crate::models::profile::UserProfile;

#[derive(Default)]
struct Tables {
    profiles: HashMap<String, UserProfile>,
    institutions: HashMap<Uuid, Institution>,
    jobs: HashMap<Uuid, Job>,
    applications: HashMap<Uuid, Application>,
}

impl Tables {
    fn application_count(&self, job_id: Uuid) -> i64 {
        self.applications
            .values()
            .filter(|a| a.job_id == job_id)
            .count() as i64
    }

    fn with_count(&self, job: &Job) -> Job {
        Job {
            applications_count: self.application_count(job.id),
            ..job.clone()
        }
    }

    fn roll_number_taken(&self, roll_number: Option<&str>, owner: &str) -> bool {
        roll_number.is_some_and(|roll| {
            self.profiles
                .values()
                .any(|p| p.clerk_user_id != owner && p.roll_number.as_deref() == Some(roll))
        })
    }
}

/// In-process store with the same unique keys as the Postgres schema.
/// Every write takes the single write lock, so uniqueness checks and
/// inserts are atomic with respect to each other.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn find_profile(&self, clerk_user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(clerk_user_id).cloned())
    }

    async fn find_profile_by_roll_number(
        &self,
        roll_number: &str,
    ) -> StoreResult<Option<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.roll_number.as_deref() == Some(roll_number))
            .cloned())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.clerk_user_id) {
            return Err(StoreError::Duplicate(UniqueKey::IdentityId));
        }
        if tables.roll_number_taken(profile.roll_number.as_deref(), &profile.clerk_user_id) {
            return Err(StoreError::Duplicate(UniqueKey::RollNumber));
        }
        tables
            .profiles
            .insert(profile.clerk_user_id.clone(), profile.clone());
        Ok(profile.clone())
    }

    async fn update_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        let mut tables = self.tables.write().await;
        if tables.roll_number_taken(profile.roll_number.as_deref(), &profile.clerk_user_id) {
            return Err(StoreError::Duplicate(UniqueKey::RollNumber));
        }
        let stored = tables
            .profiles
            .get_mut(&profile.clerk_user_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("Profile {} not found", profile.clerk_user_id))
            })?;
        // id and created_at belong to the stored row
        *stored = UserProfile {
            id: stored.id,
            created_at: stored.created_at,
            ..profile.clone()
        };
        Ok(stored.clone())
    }

    async fn insert_institution(&self, institution: &Institution) -> StoreResult<Institution> {
        let mut tables = self.tables.write().await;
        if tables
            .institutions
            .values()
            .any(|i| i.code == institution.code)
        {
            return Err(StoreError::Duplicate(UniqueKey::InstitutionCode));
        }
        tables
            .institutions
            .insert(institution.id, institution.clone());
        Ok(institution.clone())
    }

    async fn find_institution(&self, id: Uuid) -> StoreResult<Option<Institution>> {
        Ok(self.tables.read().await.institutions.get(&id).cloned())
    }

    async fn list_institutions(&self) -> StoreResult<Vec<Institution>> {
        let mut institutions: Vec<_> = self
            .tables
            .read()
            .await
            .institutions
            .values()
            .cloned()
            .collect();
        institutions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(institutions)
    }

    async fn update_institution(&self, institution: &Institution) -> StoreResult<Institution> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .institutions
            .get_mut(&institution.id)
            .ok_or_else(|| StoreError::NotFound(format!("Institution {} not found", institution.id)))?;
        *stored = Institution {
            code: stored.code.clone(),
            created_at: stored.created_at,
            ..institution.clone()
        };
        Ok(stored.clone())
    }

    async fn insert_job(&self, job: &Job) -> StoreResult<Job> {
        let mut tables = self.tables.write().await;
        let job = Job {
            applications_count: 0,
            ..job.clone()
        };
        tables.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        let tables = self.tables.read().await;
        Ok(tables.jobs.get(&id).map(|job| tables.with_count(job)))
    }

    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        let tables = self.tables.read().await;
        let mut jobs: Vec<_> = tables.jobs.values().map(|j| tables.with_count(j)).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn list_open_jobs(&self, now: DateTime<Utc>) -> StoreResult<Vec<Job>> {
        let tables = self.tables.read().await;
        let mut jobs: Vec<_> = tables
            .jobs
            .values()
            .filter(|j| j.is_active && j.application_deadline >= now)
            .map(|j| tables.with_count(j))
            .collect();
        jobs.sort_by(|a, b| a.application_deadline.cmp(&b.application_deadline));
        Ok(jobs)
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        Ok(self.tables.read().await.applications.get(&id).cloned())
    }

    async fn find_application_for(
        &self,
        student_id: &str,
        job_id: Uuid,
    ) -> StoreResult<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .values()
            .find(|a| a.student_id == student_id && a.job_id == job_id)
            .cloned())
    }

    async fn insert_application(&self, application: &Application) -> StoreResult<Application> {
        let mut tables = self.tables.write().await;
        if tables
            .applications
            .values()
            .any(|a| a.student_id == application.student_id && a.job_id == application.job_id)
        {
            return Err(StoreError::Duplicate(UniqueKey::Application));
        }
        tables
            .applications
            .insert(application.id, application.clone());
        Ok(application.clone())
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Application>> {
        let mut tables = self.tables.write().await;
        Ok(tables.applications.get_mut(&id).map(|application| {
            application.status = status;
            application.last_updated = at;
            application.clone()
        }))
    }

    async fn list_applications_for_student(
        &self,
        student_id: &str,
    ) -> StoreResult<Vec<Application>> {
        let tables = self.tables.read().await;
        let mut applications: Vec<_> = tables
            .applications
            .values()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(applications)
    }

    async fn list_applications_for_job(&self, job_id: Uuid) -> StoreResult<Vec<Application>> {
        let tables = self.tables.read().await;
        let mut applications: Vec<_> = tables
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| a.applied_at.cmp(&b.applied_at));
        Ok(applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile(id: &str, roll: Option<&str>) -> UserProfile {
        let mut p = UserProfile::new(id, Utc::now());
        p.roll_number = roll.map(String::from);
        p
    }

    #[tokio::test]
    async fn test_insert_rejects_second_identity() {
        let store = MemoryStore::new();
        store.insert_profile(&profile("u1", None)).await.unwrap();
        let err = store.insert_profile(&profile("u1", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueKey::IdentityId)));
    }

    #[tokio::test]
    async fn test_roll_number_unique_across_identities() {
        let store = MemoryStore::new();
        store.insert_profile(&profile("u1", Some("A1"))).await.unwrap();
        let err = store
            .insert_profile(&profile("u2", Some("A1")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueKey::RollNumber)));
    }

    #[tokio::test]
    async fn test_profiles_without_roll_number_coexist() {
        let store = MemoryStore::new();
        store.insert_profile(&profile("u1", None)).await.unwrap();
        store.insert_profile(&profile("u2", None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_keeps_row_identity() {
        let store = MemoryStore::new();
        let original = store.insert_profile(&profile("u1", None)).await.unwrap();
        let mut changed = profile("u1", Some("B7"));
        changed.name = Some("Asha".into());
        let saved = store.update_profile(&changed).await.unwrap();
        assert_eq!(saved.id, original.id);
        assert_eq!(saved.created_at, original.created_at);
        assert_eq!(saved.roll_number.as_deref(), Some("B7"));
    }

    #[tokio::test]
    async fn test_update_missing_profile_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update_profile(&profile("ghost", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_open_jobs_filter_inactive_and_expired() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let base = Job {
            id: Uuid::new_v4(),
            title: "SDE".into(),
            company: "Acme".into(),
            description: None,
            location: None,
            salary: None,
            job_type: None,
            min_cgpa: 0.0,
            allowed_branches: vec![],
            academic_year: vec![4],
            application_deadline: now + Duration::days(3),
            is_active: true,
            institution_id: None,
            posted_by: None,
            created_at: now,
            applications_count: 0,
        };
        let expired = Job {
            id: Uuid::new_v4(),
            application_deadline: now - Duration::days(1),
            ..base.clone()
        };
        let inactive = Job {
            id: Uuid::new_v4(),
            is_active: false,
            ..base.clone()
        };
        for job in [&base, &expired, &inactive] {
            store.insert_job(job).await.unwrap();
        }

        let open = store.list_open_jobs(now).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, base.id);
        assert_eq!(store.list_jobs().await.unwrap().len(), 3);
    }
}
