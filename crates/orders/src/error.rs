//! Unified error handling for the orders service.
//!
//! Provides a single `AppError` type mapping each failure class to its own
//! response code and JSON body shape. All route handlers return
//! `Result<T, AppError>`; no store failure crashes the process.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type for the orders service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing input from the client.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested entity does not exist (or is not owned by the given customer).
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Stable machine-readable error code for the response body.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
