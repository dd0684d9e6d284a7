use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::models::profile::UserProfile;
use crate::profiles::service::{self, OnboardingStatus};
use crate::profiles::validation::ProfileInput;
use crate::state::AppState;

/// POST /users/profile
///
/// 201 when the profile was created, 200 when an existing one was updated.
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ProfileInput>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let outcome = service::upsert_profile(state.store.as_ref(), input).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.profile)))
}

/// PUT /users/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ProfileInput>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = service::update_profile(state.store.as_ref(), input).await?;
    Ok(Json(profile))
}

/// GET /users/profile/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    ValidatedPath(identity): ValidatedPath<String>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = service::get_profile(state.store.as_ref(), &identity).await?;
    Ok(Json(profile))
}

/// GET /users/profile/:id/check-onboarding
pub async fn handle_check_onboarding(
    State(state): State<AppState>,
    ValidatedPath(identity): ValidatedPath<String>,
) -> Result<Json<OnboardingStatus>, AppError> {
    let status = service::check_onboarding(state.store.as_ref(), &identity).await?;
    Ok(Json(status))
}
