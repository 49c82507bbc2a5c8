use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// A detected double-booking, with enough context for a caller to explain it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConflictError {
    #[serde(rename = "error")]
    pub message: String,
    pub conflict_tags: Vec<String>,
    pub conflicting_entry_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_start_at: Option<DateTime<Utc>>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Schedule conflict: {}", .0.message)]
    ScheduleConflict(Box<ConflictError>),
    #[error("Invalid input: {0}")]
    Validation(String),
}

/// Failures that stop the service from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConflictError> for AppError {
    fn from(conflict: ConflictError) -> Self {
        AppError::ScheduleConflict(Box::new(conflict))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 40001 = PostgreSQL serialization failure
                    // 23P01 = PostgreSQL exclusion violation
                    // 5 / 517 = SQLite busy / busy snapshot
                    if code == "40001" || code == "23P01" || code == "5" || code == "517" {
                        warn!("Concurrent schedule write rejected: {:?}", e);
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({
                                "error": "The schedule changed concurrently, retry the request",
                                "conflict_tags": ["concurrent"]
                            }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ScheduleConflict(conflict) => {
                return (StatusCode::CONFLICT, Json(conflict.as_ref().clone())).into_response();
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
