use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::institutions::service::{self, InstitutionInput};
use crate::models::institution::{Coordinator, Institution};
use crate::state::AppState;

/// GET /institutions
pub async fn handle_list_institutions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Institution>>, AppError> {
    Ok(Json(service::list_institutions(state.store.as_ref()).await?))
}

/// POST /institutions
pub async fn handle_register_institution(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<InstitutionInput>,
) -> Result<(StatusCode, Json<Institution>), AppError> {
    let institution = service::register_institution(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(institution)))
}

/// GET /institutions/:id
pub async fn handle_get_institution(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<Institution>, AppError> {
    Ok(Json(service::get_institution(state.store.as_ref(), id).await?))
}

/// PATCH /institutions/:id/approve
pub async fn handle_approve_institution(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<Institution>, AppError> {
    Ok(Json(service::approve_institution(state.store.as_ref(), id).await?))
}

/// POST /institutions/:id/coordinators
pub async fn handle_add_coordinator(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(coordinator): ValidatedJson<Coordinator>,
) -> Result<(StatusCode, Json<Institution>), AppError> {
    let institution = service::add_coordinator(state.store.as_ref(), id, coordinator).await?;
    Ok((StatusCode::CREATED, Json(institution)))
}
