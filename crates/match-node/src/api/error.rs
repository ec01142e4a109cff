//! Gateway error responses.
//!
//! Every failure leaves the gateway as `{"error": <code>, "message": <text>}`
//! with a status derived from the error kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use match_consensus::ConsensusError;
use match_telemetry::{metric_inc, OPERATION_ERRORS};
use serde::Serialize;

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

/// A rejected HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable detail.
    pub message: String,
}

impl ApiError {
    /// Create an error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// No usable credential.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
    }

    /// Malformed path, query or body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    /// Infrastructure failure inside the gateway itself.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

/// Status for each consensus error kind.
pub fn status_for(error: &ConsensusError) -> StatusCode {
    match error {
        ConsensusError::Unauthorized(_) | ConsensusError::SelfVerification => {
            StatusCode::FORBIDDEN
        }
        ConsensusError::NotFound { .. } => StatusCode::NOT_FOUND,
        ConsensusError::Conflict(_)
        | ConsensusError::InvalidStateTransition { .. }
        | ConsensusError::AlreadyReported(_)
        | ConsensusError::AlreadyVerified { .. } => StatusCode::CONFLICT,
        ConsensusError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ConsensusError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<ConsensusError> for ApiError {
    fn from(error: ConsensusError) -> Self {
        Self::new(status_for(&error), error.code(), error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        metric_inc!(OPERATION_ERRORS, &[self.code]);
        let body = ErrorBody {
            error: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
