use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::external::{ExternalJobsQuery, ExternalJobsResponse};
use crate::extract::ValidatedQuery;
use crate::state::AppState;

/// GET /external/jobs?what=&where=&page=
pub async fn handle_external_jobs(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ExternalJobsQuery>,
) -> Result<Json<ExternalJobsResponse>, AppError> {
    if query.page == Some(0) {
        return Err(AppError::Validation("page must be 1 or greater".to_string()));
    }

    let response = state
        .external_jobs
        .fetch_jobs(&query)
        .await
        .map_err(|e| AppError::Upstream(format!("External job search failed: {e}")))?;
    Ok(Json(response))
}
