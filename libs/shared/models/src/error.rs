use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::scheduling::AppointmentStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not permitted: {0}")]
    NotPermitted(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotPermitted(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, message);
        } else {
            tracing::warn!("Request rejected: {}: {}", status, message);
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Failures raised by a storage backend. The engine never retries these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed record: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Date {date} is outside the booking horizon")]
    OutOfHorizon { date: NaiveDate },

    #[error("Slot at {scheduled_at} is no longer available for professional {professional_id}")]
    SlotConflict {
        professional_id: Uuid,
        scheduled_at: DateTime<Utc>,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Action not permitted right now: {0}")]
    WindowClosed(String),

    #[error("Plan renewal opens in {days_remaining} day(s)")]
    RenewalNotOpen { days_remaining: i64 },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl SchedulingError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SchedulingError::InvalidInput(message.into())
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        let message = err.to_string();
        match err {
            SchedulingError::InvalidInput(_) => AppError::ValidationError(message),
            SchedulingError::OutOfHorizon { .. } => AppError::BadRequest(message),
            SchedulingError::SlotConflict { .. } => AppError::Conflict(message),
            SchedulingError::NotFound(_) => AppError::NotFound(message),
            SchedulingError::InvalidStatusTransition { .. } => AppError::Conflict(message),
            SchedulingError::WindowClosed(_) | SchedulingError::RenewalNotOpen { .. } => {
                AppError::NotPermitted(message)
            }
            SchedulingError::Repository(RepositoryError::NotFound(_)) => AppError::NotFound(message),
            SchedulingError::Repository(RepositoryError::UniqueViolation(_)) => {
                AppError::Conflict(message)
            }
            SchedulingError::Repository(_) => AppError::Database(message),
        }
    }
}
