use rym_core::CoreError;
use rym_http::HttpError;
use thiserror::Error;

/// Result type for OpenAPI operations
pub type OpenApiResult<T> = Result<T, OpenApiError>;

/// Errors that can occur during OpenAPI generation
#[derive(Debug, Error)]
pub enum OpenApiError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Endpoint that cannot be described
    #[error("Route discovery error: {0}")]
    RouteDiscovery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No OpenAPI document named '{0}' is registered")]
    UnknownDocument(String),
}

impl OpenApiError {
    pub fn route_discovery_error<T: ToString>(msg: T) -> Self {
        Self::RouteDiscovery(msg.to_string())
    }

    pub fn config_error<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }
}

impl From<OpenApiError> for CoreError {
    fn from(error: OpenApiError) -> Self {
        CoreError::registration("openapi", error.to_string())
    }
}

impl From<OpenApiError> for HttpError {
    fn from(error: OpenApiError) -> Self {
        HttpError::pipeline(error.to_string())
    }
}
