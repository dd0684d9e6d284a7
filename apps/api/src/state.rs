use std::sync::Arc;

use crate::external::ExternalJobsClient;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory when no DATABASE_URL is configured.
    pub store: Arc<dyn Store>,
    pub external_jobs: ExternalJobsClient,
}
