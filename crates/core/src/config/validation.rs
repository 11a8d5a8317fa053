use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration key: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid value for '{key}': '{value}'. Expected: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Failed to read configuration file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file '{path}': {source}")]
    FileParse {
        path: String,
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    /// Create a missing required key error
    pub fn missing_required(key: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            key: key.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}
