use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::institutions::service::ensure_institution_exists;
use crate::jobs::matcher::{filter_eligible, EligibilityCriteria};
use crate::models::job::{Application, ApplicationStatus, Job};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobInput {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub min_cgpa: f64,
    #[serde(default)]
    pub allowed_branches: Vec<String>,
    pub academic_year: Vec<i16>,
    pub application_deadline: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub institution_id: Option<Uuid>,
    #[serde(default)]
    pub posted_by: Option<String>,
}

fn default_active() -> bool {
    true
}

impl JobInput {
    fn validate(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut errors: Vec<String> = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title is required".into());
        }
        if self.company.trim().is_empty() {
            errors.push("company is required".into());
        }
        if !(0.0..=10.0).contains(&self.min_cgpa) {
            errors.push("minCgpa must be between 0 and 10".into());
        }
        if self.academic_year.is_empty() {
            errors.push("academicYear must list at least one year".into());
        }
        if let Some(year) = self.academic_year.iter().find(|y| !(1..=5).contains(*y)) {
            errors.push(format!("academicYear {year} is out of range 1-5"));
        }
        if self.allowed_branches.iter().any(|b| b.trim().is_empty()) {
            errors.push("allowedBranches cannot contain blank entries".into());
        }
        if self.application_deadline <= now {
            errors.push("applicationDeadline must be in the future".into());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors.join("; ")))
        }
    }
}

pub async fn create_job<S: Store + ?Sized>(store: &S, input: JobInput) -> Result<Job, AppError> {
    let now = Utc::now();
    input.validate(now)?;
    ensure_institution_exists(store, input.institution_id).await?;

    let mut academic_year = input.academic_year;
    academic_year.sort_unstable();
    academic_year.dedup();

    let job = Job {
        id: Uuid::new_v4(),
        title: input.title.trim().to_string(),
        company: input.company.trim().to_string(),
        description: input.description,
        location: input.location,
        salary: input.salary,
        job_type: input.job_type,
        min_cgpa: input.min_cgpa,
        allowed_branches: input
            .allowed_branches
            .into_iter()
            .map(|b| b.trim().to_string())
            .collect(),
        academic_year,
        application_deadline: input.application_deadline,
        is_active: input.is_active,
        institution_id: input.institution_id,
        posted_by: input.posted_by,
        created_at: now,
        applications_count: 0,
    };

    let saved = store.insert_job(&job).await?;
    info!("Created job {} ({} at {})", saved.id, saved.title, saved.company);
    Ok(saved)
}

pub async fn get_job<S: Store + ?Sized>(store: &S, id: Uuid) -> Result<Job, AppError> {
    store
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

pub async fn list_jobs<S: Store + ?Sized>(store: &S) -> Result<Vec<Job>, AppError> {
    Ok(store.list_jobs().await?)
}

/// Open postings the student qualifies for, soonest deadline first.
pub async fn list_eligible_jobs<S: Store + ?Sized>(
    store: &S,
    criteria: &EligibilityCriteria,
) -> Result<Vec<Job>, AppError> {
    criteria.validate()?;
    let now = Utc::now();
    let open = store.list_open_jobs(now).await?;
    Ok(filter_eligible(open, criteria, now))
}

/// Records a `pending` application. A second application for the same
/// (student, job) pair is a conflict; the unique index catches racing
/// duplicates that slip past the lookup.
pub async fn apply_to_job<S: Store + ?Sized>(
    store: &S,
    student_id: &str,
    job_id: Uuid,
) -> Result<Application, AppError> {
    let student_id = student_id.trim();
    if student_id.is_empty() {
        return Err(AppError::Validation("studentId is required".to_string()));
    }

    let job = get_job(store, job_id).await?;
    let now = Utc::now();
    if !job.is_active || job.application_deadline < now {
        return Err(AppError::Validation(format!(
            "Applications for job {job_id} are closed"
        )));
    }

    if store.find_application_for(student_id, job_id).await?.is_some() {
        return Err(AppError::conflict(
            "jobId",
            format!("Student {student_id} has already applied to job {job_id}"),
        ));
    }

    let application = Application {
        id: Uuid::new_v4(),
        student_id: student_id.to_string(),
        job_id,
        status: ApplicationStatus::Pending,
        applied_at: now,
        last_updated: now,
    };
    let saved = store.insert_application(&application).await?;
    info!("Student {student_id} applied to job {job_id}");
    Ok(saved)
}

/// Any status may replace any other: staff can move an application freely.
pub async fn update_application_status<S: Store + ?Sized>(
    store: &S,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<Application, AppError> {
    let previous = store
        .find_application(application_id)
        .await?
        .ok_or_else(|| application_not_found(application_id))?;

    let updated = store
        .set_application_status(application_id, status, Utc::now())
        .await?
        .ok_or_else(|| application_not_found(application_id))?;

    info!(
        "Application {application_id} status {} -> {}",
        previous.status, updated.status
    );
    Ok(updated)
}

pub async fn list_applications_for_student<S: Store + ?Sized>(
    store: &S,
    student_id: &str,
) -> Result<Vec<Application>, AppError> {
    Ok(store.list_applications_for_student(student_id).await?)
}

pub async fn list_applications_for_job<S: Store + ?Sized>(
    store: &S,
    job_id: Uuid,
) -> Result<Vec<Application>, AppError> {
    get_job(store, job_id).await?;
    Ok(store.list_applications_for_job(job_id).await?)
}

fn application_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Application {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn posting(branches: &[&str], years: &[i16], min_cgpa: f64) -> JobInput {
        JobInput {
            title: "Backend Engineer".into(),
            company: "Initech".into(),
            description: None,
            location: Some("Pune".into()),
            salary: None,
            job_type: Some("full_time".into()),
            min_cgpa,
            allowed_branches: branches.iter().map(|b| b.to_string()).collect(),
            academic_year: years.to_vec(),
            application_deadline: Utc::now() + Duration::days(10),
            is_active: true,
            institution_id: None,
            posted_by: Some("coord_1".into()),
        }
    }

    /// Inserts directly so the deadline can already be in the past.
    async fn expired_job(store: &MemoryStore) -> Job {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: "Old Posting".into(),
            company: "Initech".into(),
            description: None,
            location: None,
            salary: None,
            job_type: None,
            min_cgpa: 0.0,
            allowed_branches: vec![],
            academic_year: vec![1, 2, 3, 4, 5],
            application_deadline: now - Duration::hours(1),
            is_active: true,
            institution_id: None,
            posted_by: None,
            created_at: now - Duration::days(30),
            applications_count: 0,
        };
        store.insert_job(&job).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_job_rejects_past_deadline() {
        let store = MemoryStore::new();
        let mut input = posting(&[], &[4], 7.0);
        input.application_deadline = Utc::now() - Duration::days(1);
        let err = create_job(&store, input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("applicationDeadline")));
    }

    #[tokio::test]
    async fn test_create_job_rejects_unknown_institution() {
        let store = MemoryStore::new();
        let mut input = posting(&["CSE"], &[4], 7.0);
        input.institution_id = Some(Uuid::new_v4());
        let err = create_job(&store, input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("institutionId")));
        assert!(store.list_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_job_requires_years() {
        let store = MemoryStore::new();
        let err = create_job(&store, posting(&[], &[], 7.0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_eligible_listing_excludes_expired_jobs() {
        let store = MemoryStore::new();
        let open = create_job(&store, posting(&["CSE"], &[4], 7.0)).await.unwrap();
        expired_job(&store).await;
        let criteria = EligibilityCriteria {
            cgpa: 8.0,
            branch: "CSE".into(),
            year: 4,
        };
        let eligible = list_eligible_jobs(&store, &criteria).await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, open.id);
    }

    #[tokio::test]
    async fn test_apply_twice_conflicts_and_counts_once() {
        let store = MemoryStore::new();
        let job = create_job(&store, posting(&[], &[4], 0.0)).await.unwrap();

        let first = apply_to_job(&store, "student_1", job.id).await.unwrap();
        assert_eq!(first.status, ApplicationStatus::Pending);

        let err = apply_to_job(&store, "student_1", job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));

        assert_eq!(store.list_applications_for_job(job.id).await.unwrap().len(), 1);
        assert_eq!(get_job(&store, job.id).await.unwrap().applications_count, 1);
    }

    #[tokio::test]
    async fn test_count_tracks_distinct_students() {
        let store = MemoryStore::new();
        let job = create_job(&store, posting(&[], &[4], 0.0)).await.unwrap();
        for student in ["s1", "s2", "s3"] {
            apply_to_job(&store, student, job.id).await.unwrap();
        }
        assert_eq!(get_job(&store, job.id).await.unwrap().applications_count, 3);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_applications_leave_one_row() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let job = create_job(store.as_ref(), posting(&[], &[4], 0.0))
            .await
            .unwrap();
        let job_id = job.id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { apply_to_job(store.as_ref(), "s1", job_id).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::Conflict { .. }) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(get_job(store.as_ref(), job_id).await.unwrap().applications_count, 1);
    }

    #[tokio::test]
    async fn test_apply_to_unknown_job_is_not_found() {
        let store = MemoryStore::new();
        let err = apply_to_job(&store, "s1", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_apply_after_deadline_is_rejected() {
        let store = MemoryStore::new();
        let job = expired_job(&store).await;
        let err = apply_to_job(&store, "s1", job.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_status_can_move_in_any_direction() {
        let store = MemoryStore::new();
        let job = create_job(&store, posting(&[], &[4], 0.0)).await.unwrap();
        let app = apply_to_job(&store, "s1", job.id).await.unwrap();

        let selected = update_application_status(&store, app.id, ApplicationStatus::Selected)
            .await
            .unwrap();
        assert_eq!(selected.status, ApplicationStatus::Selected);
        assert!(selected.last_updated >= app.last_updated);

        let back = update_application_status(&store, app.id, ApplicationStatus::Pending)
            .await
            .unwrap();
        assert_eq!(back.status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_status_update_for_unknown_application() {
        let store = MemoryStore::new();
        let err = update_application_status(&store, Uuid::new_v4(), ApplicationStatus::Reviewed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
