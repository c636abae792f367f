//! HTTP error responses for handler failures.
//!
//! Every error renders as `{"error": "<message>"}`, the same shape the
//! identity gate uses. Extractor rejections reach this type through
//! [`crate::extract`]. Internal failures are logged and hidden from the
//! caller.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use tramites_core::CoreError;

/// Errors returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The addressed entity does not exist or is not visible to the caller.
    NotFound(String),
    /// The entity is not in a state that allows the operation.
    Conflict(String),
    /// The request body failed validation.
    InvalidInput(String),
    /// The body, path or query string could not be extracted.
    Rejected(StatusCode, String),
    /// An infrastructure failure occurred.
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => Self::NotFound(msg),
            CoreError::Conflict(msg) => Self::Conflict(msg),
            CoreError::InvalidInput(msg) | CoreError::ConstraintViolation(msg) => {
                Self::InvalidInput(msg)
            },
            CoreError::Database(_) | CoreError::Migration(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Rejected(status, msg) => (status, msg),
            Self::Internal(detail) => {
                error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
