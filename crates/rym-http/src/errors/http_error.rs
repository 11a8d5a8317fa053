//! HTTP error types
//!
//! Startup failures and per-request failures share one enum so handlers,
//! middleware and the application builder can all use `?`.

use crate::response::RymResponse;
use axum::http::StatusCode;
use rym_core::CoreError;
use thiserror::Error;

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// HTTP errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Server startup failed: {message}")]
    StartupFailed { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid pipeline: {message}")]
    InvalidPipeline { message: String },

    #[error("Service resolution failed: {0}")]
    ServiceResolution(#[from] CoreError),

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Request too large: {size} bytes exceeds limit of {limit} bytes")]
    RequestTooLarge { size: usize, limit: usize },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl HttpError {
    /// Create a startup error
    pub fn startup<T: Into<String>>(message: T) -> Self {
        HttpError::StartupFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<T: Into<String>>(message: T) -> Self {
        HttpError::ConfigError {
            message: message.into(),
        }
    }

    /// Create a pipeline assembly error
    pub fn pipeline<T: Into<String>>(message: T) -> Self {
        HttpError::InvalidPipeline {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        HttpError::BadRequest {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        HttpError::Forbidden {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<T: Into<String>>(resource: T) -> Self {
        HttpError::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(message: T) -> Self {
        HttpError::InternalError {
            message: message.into(),
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest { .. } | HttpError::Json(_) => StatusCode::BAD_REQUEST,
            HttpError::RequestTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::Unauthorized => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden { .. } => StatusCode::FORBIDDEN,
            HttpError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the error body
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::StartupFailed { .. } => "startup_failed",
            HttpError::ConfigError { .. } => "config_error",
            HttpError::InvalidPipeline { .. } => "invalid_pipeline",
            HttpError::ServiceResolution(_) => "service_resolution_failed",
            HttpError::BadRequest { .. } => "bad_request",
            HttpError::RequestTooLarge { .. } => "payload_too_large",
            HttpError::Unauthorized => "unauthorized",
            HttpError::Forbidden { .. } => "forbidden",
            HttpError::NotFound { .. } => "not_found",
            HttpError::Json(_) => "invalid_json",
            HttpError::InternalError { .. } => "internal_error",
        }
    }

    /// Convert into an error response; server-side details are not leaked
    pub fn into_response(self) -> RymResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "An unexpected error occurred".to_string()
        } else {
            self.to_string()
        };
        RymResponse::error(status, self.error_code(), &message)
    }
}
