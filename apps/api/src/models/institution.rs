use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Coordinator {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    /// Advisory only: more than one coordinator may carry it.
    #[serde(default)]
    pub is_main_coordinator: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub coordinators: Json<Vec<Coordinator>>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}
