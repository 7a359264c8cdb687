//! Error responses for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use skyforge_core::{
    matcher::MatchError, store::StoreError, ErrorCategory, OrchestratorError, ReconcileError,
};

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A status code plus message, rendered as `{"error": ...}`.
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

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Another request holds the store writer slot.
    pub fn store_busy() -> Self {
        Self::conflict("another store write is in progress")
    }

    pub fn generation_not_configured() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "generation service is not configured",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(e: OrchestratorError) -> Self {
        let status = match e.category() {
            ErrorCategory::Configuration => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCategory::Transfer | ErrorCategory::Upload => StatusCode::BAD_GATEWAY,
            ErrorCategory::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ReconcileError> for ApiError {
    fn from(e: ReconcileError) -> Self {
        let status = match &e {
            ReconcileError::Generation(_) => StatusCode::BAD_GATEWAY,
            ReconcileError::Match(MatchError::NotFound) => StatusCode::NOT_FOUND,
            ReconcileError::Match(MatchError::InvalidPattern(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ReconcileError::Store(StoreError::MissingFileName | StoreError::UnsafeFileName(_)) => {
                StatusCode::BAD_REQUEST
            }
            ReconcileError::Store(
                StoreError::DuplicateFileName(_) | StoreError::AlreadyUploaded(_),
            ) => StatusCode::CONFLICT,
            ReconcileError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}
