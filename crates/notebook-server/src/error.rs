//! API error types with JSON responses.
//!
//! Error bodies use the Jupyter shape `{"message": ..., "reason": ...}` so
//! that `RemoteContentProvider` reads them like any other contents server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notebook_contents::ContentError;
use serde::Serialize;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Failure reported by the content provider.
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Content(e) => e.reason(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Content(e) => e.status(),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub message: String,
    /// Error code (e.g., "NOT_FOUND", "INVALID_MODEL").
    pub reason: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            message: self.to_string(),
            reason: self.code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_errors_keep_provider_status() {
        let err = ApiError::from(ContentError::InvalidModel("no notebook found to save".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_MODEL");
        assert_eq!(err.to_string(), "invalid model: no notebook found to save");
    }

    #[test]
    fn unauthorized_is_401() {
        let response = ApiError::Unauthorized("missing token".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
