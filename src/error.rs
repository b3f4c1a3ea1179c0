use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AttendanceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AttendanceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AttendanceError::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AttendanceError::Validation(message.into())
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Conflict(_) => StatusCode::CONFLICT,
            AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
            AttendanceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            AttendanceError::Store(e) => {
                tracing::error!(error = %e, "Attendance store failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        envelope(status, &message)
    }
}

/// Failure body shared by handlers and the auth middleware.
pub fn envelope(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "success": false,
        "statusCode": status.as_u16(),
        "message": message,
    }))
}
