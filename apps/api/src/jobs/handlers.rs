use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::jobs::matcher::EligibilityCriteria;
use crate::jobs::service::{self, JobInput};
use crate::models::job::{Application, ApplicationStatus, Job};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplyRequest {
    pub student_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// GET /jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(service::list_jobs(state.store.as_ref()).await?))
}

/// POST /jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<JobInput>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = service::create_job(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /jobs/eligible?cgpa=&branch=&year=
pub async fn handle_eligible_jobs(
    State(state): State<AppState>,
    ValidatedQuery(criteria): ValidatedQuery<EligibilityCriteria>,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = service::list_eligible_jobs(state.store.as_ref(), &criteria).await?;
    Ok(Json(jobs))
}

/// GET /jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(service::get_job(state.store.as_ref(), id).await?))
}

/// POST /jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    ValidatedPath(job_id): ValidatedPath<Uuid>,
    ValidatedJson(req): ValidatedJson<ApplyRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let application = service::apply_to_job(state.store.as_ref(), &req.student_id, job_id).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /jobs/:id/applications
pub async fn handle_job_applications(
    State(state): State<AppState>,
    ValidatedPath(job_id): ValidatedPath<Uuid>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications = service::list_applications_for_job(state.store.as_ref(), job_id).await?;
    Ok(Json(applications))
}

/// PATCH /applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    ValidatedPath(application_id): ValidatedPath<Uuid>,
    ValidatedJson(req): ValidatedJson<StatusUpdateRequest>,
) -> Result<Json<Application>, AppError> {
    let status: ApplicationStatus = req.status.parse().map_err(AppError::Validation)?;
    let application =
        service::update_application_status(state.store.as_ref(), application_id, status).await?;
    Ok(Json(application))
}

/// GET /students/:id/applications
pub async fn handle_student_applications(
    State(state): State<AppState>,
    ValidatedPath(student_id): ValidatedPath<String>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications =
        service::list_applications_for_student(state.store.as_ref(), &student_id).await?;
    Ok(Json(applications))
}
