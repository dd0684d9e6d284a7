use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::store::{StoreError, UniqueKey};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict on {field}: {message}")]
    Conflict {
        field: &'static str,
        message: String,
    },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Conflict {
            field,
            message: message.into(),
        }
    }
}

/// Duplicate-key signals from storage become field-specific conflicts here.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(key) => {
                let message = match key {
                    UniqueKey::IdentityId => "A profile already exists for this user",
                    UniqueKey::RollNumber => {
                        "Roll number is already registered to another student"
                    }
                    UniqueKey::Application => "Student has already applied to this job",
                    UniqueKey::InstitutionCode => "An institution with this code already exists",
                };
                AppError::conflict(key.field(), message)
            }
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict {
                field: conflicting,
                message,
            } => {
                field = Some(*conflicting);
                (StatusCode::CONFLICT, "CONFLICT", message.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(field) = field {
            error["field"] = json!(field);
        }

        let body = Json(json!({
            "error": error,
            "timestamp": Utc::now().to_rfc3339()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_roll_number_duplicate_maps_to_conflict() {
        let (status, body) = body_json(StoreError::Duplicate(UniqueKey::RollNumber).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["field"], "rollNumber");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Roll number"));
    }

    #[tokio::test]
    async fn test_identity_duplicate_names_identity_field() {
        let (_, body) = body_json(StoreError::Duplicate(UniqueKey::IdentityId).into()).await;
        assert_eq!(body["error"]["field"], "clerkUserId");
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let err = AppError::Database(sqlx::Error::Protocol("secret detail".into()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert_eq!(body["error"]["message"], "A database error occurred");
        assert!(body["timestamp"].is_string());
        assert!(!body.to_string().contains("secret detail"));
    }

    #[tokio::test]
    async fn test_upstream_maps_to_bad_gateway() {
        let (status, body) = body_json(AppError::Upstream("timeout".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert!(body["error"].get("field").is_none());
    }
}
