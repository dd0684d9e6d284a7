use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::institution::Institution;
use crate::models::job::{Application, ApplicationStatus, Job};
use crate::models::profile::UserProfile;

/// Jobs are always read together with their live application count.
const JOB_SELECT: &str = r#"
    SELECT j.*, COUNT(a.id) AS applications_count
    FROM jobs j
    LEFT JOIN applications a ON a.job_id = j.id
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn find_profile(&self, clerk_user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(
            sqlx::query_as::<_, UserProfile>(
                "SELECT * FROM user_profiles WHERE clerk_user_id = $1",
            )
            .bind(clerk_user_id)
            .fetch_optional(&self.pool)
            .await?,
        )
    }

    async fn find_profile_by_roll_number(
        &self,
        roll_number: &str,
    ) -> StoreResult<Option<UserProfile>> {
        Ok(
            sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE roll_number = $1")
                .bind(roll_number)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        Ok(sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles
                (id, clerk_user_id, roll_number, name, email, phone, branch, year, cgpa,
                 semester_grades, tenth_percentage, twelfth_percentage, projects,
                 certifications, skills, linkedin_url, github_url, resume_url,
                 marks_memo_url, institution_id, is_onboarding_complete, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23)
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.clerk_user_id)
        .bind(&profile.roll_number)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.branch)
        .bind(profile.year)
        .bind(profile.cgpa)
        .bind(&profile.semester_grades)
        .bind(profile.tenth_percentage)
        .bind(profile.twelfth_percentage)
        .bind(&profile.projects)
        .bind(&profile.certifications)
        .bind(&profile.skills)
        .bind(&profile.linkedin_url)
        .bind(&profile.github_url)
        .bind(&profile.resume_url)
        .bind(&profile.marks_memo_url)
        .bind(profile.institution_id)
        .bind(profile.is_onboarding_complete)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles SET
                roll_number = $2, name = $3, email = $4, phone = $5, branch = $6, year = $7,
                cgpa = $8, semester_grades = $9, tenth_percentage = $10,
                twelfth_percentage = $11, projects = $12, certifications = $13, skills = $14,
                linkedin_url = $15, github_url = $16, resume_url = $17, marks_memo_url = $18,
                institution_id = $19, is_onboarding_complete = $20, updated_at = $21
            WHERE clerk_user_id = $1
            RETURNING *
            "#,
        )
        .bind(&profile.clerk_user_id)
        .bind(&profile.roll_number)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.branch)
        .bind(profile.year)
        .bind(profile.cgpa)
        .bind(&profile.semester_grades)
        .bind(profile.tenth_percentage)
        .bind(profile.twelfth_percentage)
        .bind(&profile.projects)
        .bind(&profile.certifications)
        .bind(&profile.skills)
        .bind(&profile.linkedin_url)
        .bind(&profile.github_url)
        .bind(&profile.resume_url)
        .bind(&profile.marks_memo_url)
        .bind(profile.institution_id)
        .bind(profile.is_onboarding_complete)
        .bind(profile.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            StoreError::NotFound(format!("Profile {} not found", profile.clerk_user_id))
        })
    }

    async fn insert_institution(&self, institution: &Institution) -> StoreResult<Institution> {
        Ok(sqlx::query_as::<_, Institution>(
            r#"
            INSERT INTO institutions
                (id, name, code, address, website, coordinators, is_approved, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(institution.id)
        .bind(&institution.name)
        .bind(&institution.code)
        .bind(&institution.address)
        .bind(&institution.website)
        .bind(&institution.coordinators)
        .bind(institution.is_approved)
        .bind(institution.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_institution(&self, id: Uuid) -> StoreResult<Option<Institution>> {
        Ok(
            sqlx::query_as::<_, Institution>("SELECT * FROM institutions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_institutions(&self) -> StoreResult<Vec<Institution>> {
        Ok(
            sqlx::query_as::<_, Institution>("SELECT * FROM institutions ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn update_institution(&self, institution: &Institution) -> StoreResult<Institution> {
        sqlx::query_as::<_, Institution>(
            r#"
            UPDATE institutions SET
                name = $2, address = $3, website = $4, coordinators = $5, is_approved = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(institution.id)
        .bind(&institution.name)
        .bind(&institution.address)
        .bind(&institution.website)
        .bind(&institution.coordinators)
        .bind(institution.is_approved)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Institution {} not found", institution.id)))
    }

    async fn insert_job(&self, job: &Job) -> StoreResult<Job> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (id, title, company, description, location, salary, job_type, min_cgpa,
                 allowed_branches, academic_year, application_deadline, is_active,
                 institution_id, posted_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *, 0::BIGINT AS applications_count
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(&job.job_type)
        .bind(job.min_cgpa)
        .bind(&job.allowed_branches)
        .bind(&job.academic_year)
        .bind(job.application_deadline)
        .bind(job.is_active)
        .bind(job.institution_id)
        .bind(&job.posted_by)
        .bind(job.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        let sql = format!("{JOB_SELECT} WHERE j.id = $1 GROUP BY j.id");
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        let sql = format!("{JOB_SELECT} GROUP BY j.id ORDER BY j.created_at DESC");
        Ok(sqlx::query_as::<_, Job>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_open_jobs(&self, now: DateTime<Utc>) -> StoreResult<Vec<Job>> {
        let sql = format!(
            "{JOB_SELECT} WHERE j.is_active AND j.application_deadline >= $1 \
             GROUP BY j.id ORDER BY j.application_deadline ASC"
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        Ok(
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_application_for(
        &self,
        student_id: &str,
        job_id: Uuid,
    ) -> StoreResult<Option<Application>> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE student_id = $1 AND job_id = $2",
        )
        .bind(student_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_application(&self, application: &Application) -> StoreResult<Application> {
        Ok(sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (id, student_id, job_id, status, applied_at, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(application.id)
        .bind(&application.student_id)
        .bind(application.job_id)
        .bind(application.status)
        .bind(application.applied_at)
        .bind(application.last_updated)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Application>> {
        Ok(sqlx::query_as::<_, Application>(
            "UPDATE applications SET status = $2, last_updated = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_applications_for_student(
        &self,
        student_id: &str,
    ) -> StoreResult<Vec<Application>> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE student_id = $1 ORDER BY applied_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_applications_for_job(&self, job_id: Uuid) -> StoreResult<Vec<Application>> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = $1 ORDER BY applied_at ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
