//! Error handling utilities for route handlers

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Extension trait for logging errors and converting to StatusCode
pub trait LogErr<T> {
    /// Log error with context and return INTERNAL_SERVER_ERROR
    fn log_500(self, context: &str) -> Result<T, StatusCode>;

    /// Log error with context and return a custom StatusCode
    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, StatusCode> {
        self.map_err(|e| {
            error!("{}: {}", context, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }

    fn log_status(self, context: &str, status: StatusCode) -> Result<T, StatusCode> {
        self.map_err(|e| {
            warn!("{}: {}", context, e);
            status
        })
    }
}

/// Handler error rendered as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Validation failure, message shown to the user
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", .0.canonical_reason().unwrap_or("Request failed"))]
    Status(StatusCode),
}

impl ApiError {
    pub fn bad_request(err: impl std::fmt::Display) -> Self {
        ApiError::BadRequest(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Status(status) => *status,
        }
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        ApiError::Status(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_use_canonical_reason() {
        let err = ApiError::from(StatusCode::NOT_FOUND);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn log_500_maps_any_display_error() {
        let result: Result<(), String> = Err("boom".into());
        assert_eq!(result.log_500("context"), Err(StatusCode::INTERNAL_SERVER_ERROR));

        let result: Result<(), String> = Err("bad".into());
        assert_eq!(
            result.log_status("context", StatusCode::BAD_REQUEST),
            Err(StatusCode::BAD_REQUEST)
        );
    }
}
