//! # rym-security
//!
//! Named CORS policies, their registration in the service collection and the
//! CORS pipeline stage.

pub mod config;
pub mod integration;
pub mod middleware;

pub use config::{AllowList, CorsOptions, CorsPolicy, CorsPolicyBuilder};
pub use integration::{CorsApplicationBuilderExt, CorsServiceCollectionExt};
pub use middleware::cors::CorsMiddleware;

use rym_core::CoreError;

/// Common result type for security operations
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Security-related errors
#[derive(thiserror::Error, Debug)]
pub enum SecurityError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("No CORS policy named '{name}' is registered")]
    UnknownPolicy { name: String },
}

impl SecurityError {
    pub fn config<T: Into<String>>(message: T) -> Self {
        SecurityError::ConfigError {
            message: message.into(),
        }
    }
}

impl From<SecurityError> for CoreError {
    fn from(error: SecurityError) -> Self {
        CoreError::registration("security", error.to_string())
    }
}
