//! Unified error handling for HTTP handlers.
//!
//! Every error body is JSON. Client errors carry their message (and field
//! details for validation failures); server errors are reported to Sentry
//! and answered with a generic message.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use contact_desk_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::services::{ClassifierError, ContactError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more contact fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Image classification failed.
    #[error("Classification error: {0}")]
    Classification(ClassifierError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::ValidationFailed(errors) => Self::Validation(errors),
            ContactError::NotFound => Self::NotFound("Contact not found".to_owned()),
            ContactError::PersistenceFailed(e) => Self::Database(e),
        }
    }
}

impl From<ClassifierError> for AppError {
    fn from(err: ClassifierError) -> Self {
        if err.is_invalid_input() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Classification(err)
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Classification(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(details) => json!({
                "error": "Validation failed",
                "details": details,
            }),
            Self::NotFound(message) | Self::BadRequest(message) => json!({ "error": message }),
            Self::Classification(_) => json!({ "error": "Classification failed" }),
            Self::Database(_) | Self::Internal(_) => json!({ "error": "Internal server error" }),
        };

        (status, Json(body)).into_response()
    }
}
