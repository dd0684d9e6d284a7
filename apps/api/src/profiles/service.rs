use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use tracing::info;

use crate::errors::AppError;
use crate::institutions::service::ensure_institution_exists;
use crate::models::profile::UserProfile;
use crate::profiles::validation::{require_identity, validate_profile_input, ProfileInput};
use crate::store::Store;

pub struct UpsertOutcome {
    pub profile: UserProfile,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub is_onboarding_complete: bool,
    pub has_profile: bool,
}

/// Creates the profile for `clerkUserId`, or overwrites the fields present
/// in `input` on the existing one. Every successful upsert marks onboarding
/// as complete.
pub async fn upsert_profile<S: Store + ?Sized>(
    store: &S,
    input: ProfileInput,
) -> Result<UpsertOutcome, AppError> {
    let identity = require_identity(&input)?;
    validate_profile_input(&input)?;
    ensure_institution_exists(store, input.institution_id).await?;
    ensure_roll_number_free(store, &identity, input.roll_number.as_deref()).await?;

    let now = Utc::now();
    match store.find_profile(&identity).await? {
        Some(mut profile) => {
            apply_input(&mut profile, input, now);
            profile.is_onboarding_complete = true;
            let saved = store.update_profile(&profile).await?;
            info!("Updated profile for user {identity}");
            Ok(UpsertOutcome {
                profile: saved,
                created: false,
            })
        }
        None => {
            let mut profile = UserProfile::new(&identity, now);
            apply_input(&mut profile, input, now);
            profile.is_onboarding_complete = true;
            let saved = store.insert_profile(&profile).await?;
            info!("Created profile for user {identity}");
            Ok(UpsertOutcome {
                profile: saved,
                created: true,
            })
        }
    }
}

/// Partial update of an existing profile. The identity id only selects the
/// record; it is never rewritten.
pub async fn update_profile<S: Store + ?Sized>(
    store: &S,
    input: ProfileInput,
) -> Result<UserProfile, AppError> {
    let identity = require_identity(&input)?;
    validate_profile_input(&input)?;

    let mut profile = store
        .find_profile(&identity)
        .await?
        .ok_or_else(|| profile_not_found(&identity))?;
    ensure_institution_exists(store, input.institution_id).await?;
    ensure_roll_number_free(store, &identity, input.roll_number.as_deref()).await?;

    let onboarding = input.is_onboarding_complete;
    apply_input(&mut profile, input, Utc::now());
    if let Some(complete) = onboarding {
        profile.is_onboarding_complete = complete;
    }

    let saved = store.update_profile(&profile).await?;
    info!("Updated profile fields for user {identity}");
    Ok(saved)
}

pub async fn get_profile<S: Store + ?Sized>(
    store: &S,
    identity: &str,
) -> Result<UserProfile, AppError> {
    store
        .find_profile(identity)
        .await?
        .ok_or_else(|| profile_not_found(identity))
}

/// A missing profile is reported as incomplete, not as an error.
pub async fn check_onboarding<S: Store + ?Sized>(
    store: &S,
    identity: &str,
) -> Result<OnboardingStatus, AppError> {
    Ok(match store.find_profile(identity).await? {
        Some(profile) => OnboardingStatus {
            is_onboarding_complete: profile.is_onboarding_complete,
            has_profile: true,
        },
        None => OnboardingStatus {
            is_onboarding_complete: false,
            has_profile: false,
        },
    })
}

/// Fails when a different identity already holds `roll_number`. The unique
/// index still backs this up if two writers race past the check.
async fn ensure_roll_number_free<S: Store + ?Sized>(
    store: &S,
    identity: &str,
    roll_number: Option<&str>,
) -> Result<(), AppError> {
    let Some(roll_number) = roll_number.map(str::trim) else {
        return Ok(());
    };
    match store.find_profile_by_roll_number(roll_number).await? {
        Some(holder) if holder.clerk_user_id != identity => Err(AppError::conflict(
            "rollNumber",
            format!("Roll number '{roll_number}' is already registered to another student"),
        )),
        _ => Ok(()),
    }
}

fn profile_not_found(identity: &str) -> AppError {
    AppError::NotFound(format!("Profile not found for user {identity}"))
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Empty string means "clear this link".
fn optional_link(value: String) -> Option<String> {
    Some(trimmed(value)).filter(|v| !v.is_empty())
}

fn apply_input(profile: &mut UserProfile, input: ProfileInput, now: DateTime<Utc>) {
    let ProfileInput {
        clerk_user_id: _,
        roll_number,
        name,
        email,
        phone,
        branch,
        year,
        cgpa,
        semester_grades,
        tenth_percentage,
        twelfth_percentage,
        projects,
        certifications,
        skills,
        linkedin_url,
        github_url,
        resume_url,
        marks_memo_url,
        institution_id,
        is_onboarding_complete: _,
    } = input;

    if let Some(v) = roll_number {
        profile.roll_number = Some(trimmed(v));
    }
    if let Some(v) = name {
        profile.name = Some(trimmed(v));
    }
    if let Some(v) = email {
        profile.email = Some(trimmed(v).to_lowercase());
    }
    if let Some(v) = phone {
        profile.phone = Some(trimmed(v));
    }
    if let Some(v) = branch {
        profile.branch = Some(trimmed(v));
    }
    if year.is_some() {
        profile.year = year;
    }
    if cgpa.is_some() {
        profile.cgpa = cgpa;
    }
    if let Some(v) = semester_grades {
        profile.semester_grades = Json(v);
    }
    if tenth_percentage.is_some() {
        profile.tenth_percentage = tenth_percentage;
    }
    if twelfth_percentage.is_some() {
        profile.twelfth_percentage = twelfth_percentage;
    }
    if let Some(v) = projects {
        profile.projects = Json(v);
    }
    if let Some(v) = certifications {
        profile.certifications = Json(v);
    }
    if let Some(v) = skills {
        let mut seen = HashSet::new();
        profile.skills = v
            .into_iter()
            .map(trimmed)
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
    }
    if let Some(v) = linkedin_url {
        profile.linkedin_url = optional_link(v);
    }
    if let Some(v) = github_url {
        profile.github_url = optional_link(v);
    }
    if let Some(v) = resume_url {
        profile.resume_url = optional_link(v);
    }
    if let Some(v) = marks_memo_url {
        profile.marks_memo_url = optional_link(v);
    }
    if institution_id.is_some() {
        profile.institution_id = institution_id;
    }
    profile.updated_at = now;
}
