use crate::config::ConfigError;
use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type shared by the composition root and its collaborators
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Service not found: {service_type}")]
    ServiceNotFound { service_type: String },

    #[error("Service type mismatch for '{service_type}'")]
    ServiceTypeMismatch { service_type: String },

    #[error("Circular dependency detected: {path}")]
    CircularDependency { path: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Registration failed for '{module}': {message}")]
    Registration { module: String, message: String },

    #[error("Service initialization failed for '{service_type}': {source}")]
    ServiceInitializationFailed {
        service_type: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CoreError {
    /// Create a new service not found error
    pub fn service_not_found(service_type: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_type: service_type.into(),
        }
    }

    /// Create a new registration error attributed to a module
    pub fn registration(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registration {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Wrap an arbitrary error raised while constructing a service
    pub fn initialization<E>(service_type: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ServiceInitializationFailed {
            service_type: service_type.into(),
            source: Box::new(source),
        }
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if the error is a missing service
    pub fn is_service_not_found(&self) -> bool {
        matches!(self, Self::ServiceNotFound { .. })
    }
}
