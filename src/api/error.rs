//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::booking::BookingError;
use crate::db::DatabaseError;
use crate::eligibility::{AppointmentAction, Verdict};

/// Structured error response body for the storefront client.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Refused: {message}")]
    ActionRefused { code: &'static str, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a refused eligibility verdict to a conflict response carrying the
    /// machine-readable reason and the user-facing message.
    pub fn refusal(action: AppointmentAction, verdict: &Verdict) -> Self {
        match verdict.reason {
            Some(reason) => ApiError::ActionRefused {
                code: reason.code(),
                message: reason.message(action),
            },
            None => ApiError::ActionRefused {
                code: "refused",
                message: "This action is not currently allowed.".into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::ActionRefused { code, message } => (StatusCode::CONFLICT, code, message),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            DatabaseError::InvalidEnum { field, value } => {
                ApiError::BadRequest(format!("invalid {field}: '{value}'"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Database(e) => e.into(),
            BookingError::InvalidSchedule(detail) => ApiError::BadRequest(detail),
        }
    }
}
