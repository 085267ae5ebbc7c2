//! Unified error handling for the users service.
//!
//! Maps the saga's error taxonomy to distinct response codes and JSON body
//! shapes. The two cross-service outcomes are never conflated: an upstream
//! failure means nothing happened, a partial failure means an order exists
//! with no back-reference - the client must be able to tell them apart, so
//! the partial-failure body carries the orphan order id.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use orderlink_core::OrderId;

use crate::clients::ClientError;
use crate::saga::SagaError;
use crate::store::StoreError;

/// Application-level error type for the users service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing input from the client.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The inter-service call failed: unreachable, timed out, or the orders
    /// service answered with a non-success status. No local mutation
    /// happened.
    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    /// The remote write succeeded but the local back-reference append
    /// failed; `order_id` is the orphan to complete or compensate.
    #[error("Partial failure: order {order_id} created but not linked: {message}")]
    PartialFailure { order_id: OrderId, message: String },

    /// Local store failure unrelated to the saga.
    #[error("Store error: {0}")]
    Persistence(String),
}

impl AppError {
    /// Stable machine-readable error code for the response body.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Upstream(_) => "upstream_error",
            Self::PartialFailure { .. } => "partial_failure",
            Self::Persistence(_) => "persistence_error",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("user {id}")),
            StoreError::Unavailable(message) => Self::Persistence(message),
        }
    }
}

impl From<SagaError> for AppError {
    fn from(err: SagaError) -> Self {
        match err {
            SagaError::Validation(message) => Self::Validation(message),
            SagaError::UserNotFound(id) => Self::NotFound(format!("user {id}")),
            SagaError::Upstream(source) => Self::Upstream(source),
            SagaError::PartialFailure { order_id, source } => Self::PartialFailure {
                order_id,
                message: source.to_string(),
            },
            SagaError::Store(source) => source.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::PartialFailure { .. } | Self::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if matches!(self, Self::Upstream(_) | Self::PartialFailure { .. }) {
            tracing::error!(error = %self, "Request error");
        }

        let mut body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        if let Self::PartialFailure { order_id, .. } = &self {
            body["orderId"] = json!(order_id);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
