//! API error handling utilities.

use crate::services::{ExportError, SubmissionError};
use crate::storage::StorageError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn form_not_found() -> Self {
        Self::not_found("Form not found")
    }

    pub fn draft_not_found() -> Self {
        Self::not_found("Draft not found")
    }

    pub fn draft_publishing() -> Self {
        Self::new(StatusCode::CONFLICT, "Draft is being published")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "status": self.status.as_u16(),
        });

        (self.status, axum::Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { .. } => Self::not_found(e.to_string()),
            StorageError::ConnectionError(_) => {
                error!("Form store unavailable: {}", e);
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "Form store unavailable")
            }
            StorageError::SerializationError(_) | StorageError::Other(_) => {
                error!("Form store error: {}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Form store error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<SubmissionError> for ApiError {
    fn from(e: SubmissionError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::NoResponses => Self::not_found(e.to_string()),
            ExportError::Write(_) => {
                error!("CSV export failed: {}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CSV export failed")
            }
        }
    }
}
