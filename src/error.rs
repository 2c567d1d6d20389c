//! Error types for authhook
//!
//! All handler errors are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::PayloadError;

/// Application-wide error type
///
/// Every variant maps to a status code and a `{ "message": ... }` body.
/// Internal details are logged, never returned to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    /// Webhook provenance check failed (401)
    #[error("Invalid API key")]
    InvalidApiKey,

    /// No valid session principal (401)
    #[error("Unauthorized request")]
    Unauthorized,

    /// Webhook body failed validation (400)
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token encoding/signing error (500)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Socket or listener error (500)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Status code and public message for this error.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Invalid API key"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized request"),
            AppError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "Invalid payload"),
            AppError::Config(_)
            | AppError::Encryption(_)
            | AppError::Io(_)
            | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidApiKey => "invalid_api_key",
            AppError::Unauthorized => "unauthorized",
            AppError::InvalidPayload(_) => "invalid_payload",
            AppError::Config(_) => "config",
            AppError::Encryption(_) => "encryption",
            AppError::Io(_) => "io",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Server-side failures are logged with their full cause before the
    /// generic message is returned.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[self.error_type()]).inc();

        let body = Json(serde_json::json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
