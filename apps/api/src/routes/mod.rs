pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::external::handlers as external;
use crate::institutions::handlers as institutions;
use crate::jobs::handlers as jobs;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route(
            "/users/profile",
            post(profiles::handle_upsert_profile).put(profiles::handle_update_profile),
        )
        .route("/users/profile/:id", get(profiles::handle_get_profile))
        .route(
            "/users/profile/:id/check-onboarding",
            get(profiles::handle_check_onboarding),
        )
        // External postings
        .route("/external/jobs", get(external::handle_external_jobs))
        // Jobs and applications
        .route(
            "/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/jobs/eligible", get(jobs::handle_eligible_jobs))
        .route("/jobs/:id", get(jobs::handle_get_job))
        .route("/jobs/:id/apply", post(jobs::handle_apply))
        .route(
            "/jobs/:id/applications",
            get(jobs::handle_job_applications),
        )
        .route(
            "/applications/:id/status",
            patch(jobs::handle_update_status),
        )
        .route(
            "/students/:id/applications",
            get(jobs::handle_student_applications),
        )
        // Institutions
        .route(
            "/institutions",
            get(institutions::handle_list_institutions)
                .post(institutions::handle_register_institution),
        )
        .route(
            "/institutions/:id",
            get(institutions::handle_get_institution),
        )
        .route(
            "/institutions/:id/approve",
            patch(institutions::handle_approve_institution),
        )
        .route(
            "/institutions/:id/coordinators",
            post(institutions::handle_add_coordinator),
        )
        .with_state(state)
}
