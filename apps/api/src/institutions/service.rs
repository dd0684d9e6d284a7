use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::institution::{Coordinator, Institution};
use crate::profiles::validation::is_valid_email;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InstitutionInput {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub coordinators: Vec<Coordinator>,
}

fn coordinator_errors(coordinator: &Coordinator, errors: &mut Vec<String>) {
    if coordinator.name.trim().is_empty() {
        errors.push("coordinator name is required".to_string());
    }
    if !is_valid_email(coordinator.email.trim()) {
        errors.push(format!(
            "coordinator email '{}' is not a valid email address",
            coordinator.email
        ));
    }
}

fn into_result(errors: Vec<String>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}

fn normalize_coordinator(coordinator: Coordinator) -> Coordinator {
    Coordinator {
        name: coordinator.name.trim().to_string(),
        email: coordinator.email.trim().to_lowercase(),
        ..coordinator
    }
}

/// New institutions start unapproved.
pub async fn register_institution<S: Store + ?Sized>(
    store: &S,
    input: InstitutionInput,
) -> Result<Institution, AppError> {
    let mut errors = Vec::new();
    if input.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if input.code.trim().is_empty() {
        errors.push("code is required".to_string());
    }
    if input.coordinators.is_empty() {
        errors.push("at least one coordinator is required".to_string());
    }
    for coordinator in &input.coordinators {
        coordinator_errors(coordinator, &mut errors);
    }
    into_result(errors)?;

    let institution = Institution {
        id: Uuid::new_v4(),
        name: input.name.trim().to_string(),
        code: input.code.trim().to_uppercase(),
        address: input.address,
        website: input.website,
        coordinators: Json(
            input
                .coordinators
                .into_iter()
                .map(normalize_coordinator)
                .collect(),
        ),
        is_approved: false,
        created_at: Utc::now(),
    };

    let saved = store.insert_institution(&institution).await?;
    info!("Registered institution {} ({})", saved.name, saved.code);
    Ok(saved)
}

pub async fn get_institution<S: Store + ?Sized>(
    store: &S,
    id: Uuid,
) -> Result<Institution, AppError> {
    store
        .find_institution(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Institution {id} not found")))
}

/// Rejects a client-supplied `institutionId` that names no registered
/// institution. `None` is accepted.
pub async fn ensure_institution_exists<S: Store + ?Sized>(
    store: &S,
    id: Option<Uuid>,
) -> Result<(), AppError> {
    let Some(id) = id else {
        return Ok(());
    };
    match store.find_institution(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Validation(format!(
            "institutionId {id} does not match a registered institution"
        ))),
    }
}

pub async fn list_institutions<S: Store + ?Sized>(
    store: &S,
) -> Result<Vec<Institution>, AppError> {
    Ok(store.list_institutions().await?)
}

pub async fn approve_institution<S: Store + ?Sized>(
    store: &S,
    id: Uuid,
) -> Result<Institution, AppError> {
    let mut institution = get_institution(store, id).await?;
    if institution.is_approved {
        return Ok(institution);
    }
    institution.is_approved = true;
    let saved = store.update_institution(&institution).await?;
    info!("Approved institution {}", saved.code);
    Ok(saved)
}

/// Appends a coordinator. Several coordinators may be flagged as main.
pub async fn add_coordinator<S: Store + ?Sized>(
    store: &S,
    id: Uuid,
    coordinator: Coordinator,
) -> Result<Institution, AppError> {
    let mut errors = Vec::new();
    coordinator_errors(&coordinator, &mut errors);
    into_result(errors)?;

    let mut institution = get_institution(store, id).await?;
    institution
        .coordinators
        .0
        .push(normalize_coordinator(coordinator));
    Ok(store.update_institution(&institution).await?)
}
