//! Authentication and authorization error types

use rym_core::{ConfigError, CoreError};
use rym_http::http::StatusCode;
use rym_http::{HttpError, RymResponse};
use thiserror::Error;

/// Authentication and authorization errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Bearer token present but unusable
    #[error("Token error: {message}")]
    TokenError { message: String },

    /// Endpoint needs an authenticated caller
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    #[error("Authentication configuration error: {message}")]
    ConfigurationError { message: String },
}

impl AuthError {
    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::TokenError { .. } => "invalid_token",
            AuthError::AuthenticationRequired => "unauthorized",
            AuthError::AccessDenied { .. } => "forbidden",
            AuthError::ConfigurationError { .. } => "auth_configuration_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::TokenError { .. } | AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            AuthError::ConfigurationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn token_error(message: impl Into<String>) -> Self {
        Self::TokenError {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// JSON error response; 401s carry a `WWW-Authenticate: Bearer` challenge
    pub fn into_response(self) -> RymResponse {
        let status = self.status_code();
        let mut response = RymResponse::error(status, self.error_code(), &self.to_string());
        if status == StatusCode::UNAUTHORIZED {
            let challenge = match &self {
                AuthError::TokenError { message } => format!(
                    "Bearer error=\"invalid_token\", error_description=\"{}\"",
                    message.replace('"', "'")
                ),
                _ => "Bearer".to_string(),
            };
            response = response.with_header("www-authenticate", &challenge);
        }
        response
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        let message = match error.kind() {
            ErrorKind::ExpiredSignature => "The token is expired".to_string(),
            ErrorKind::InvalidSignature => "The signature is invalid".to_string(),
            ErrorKind::InvalidIssuer => "The issuer is invalid".to_string(),
            ErrorKind::InvalidAudience => "The audience is invalid".to_string(),
            ErrorKind::ImmatureSignature => "The token is not valid yet".to_string(),
            ErrorKind::InvalidAlgorithm => "The signing algorithm is not accepted".to_string(),
            ErrorKind::MissingRequiredClaim(claim) => format!("The '{}' claim is missing", claim),
            _ => "The token is malformed".to_string(),
        };
        AuthError::token_error(message)
    }
}

impl From<ConfigError> for AuthError {
    fn from(error: ConfigError) -> Self {
        AuthError::configuration_error(error.to_string())
    }
}

impl From<AuthError> for CoreError {
    fn from(error: AuthError) -> Self {
        CoreError::registration("auth", error.to_string())
    }
}

impl From<AuthError> for HttpError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::TokenError { .. } | AuthError::AuthenticationRequired => HttpError::Unauthorized,
            AuthError::AccessDenied { message } => HttpError::forbidden(message),
            AuthError::ConfigurationError { message } => HttpError::config(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_on_unauthorized() {
        let response = AuthError::AuthenticationRequired.into_response();
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.header_str("www-authenticate"), Some("Bearer"));

        let body: serde_json::Value = serde_json::from_slice(response.body_bytes()).unwrap();
        assert_eq!(body["error"]["code"], "unauthorized");
    }

    #[test]
    fn test_invalid_token_challenge() {
        let response = AuthError::token_error("The token is expired").into_response();
        assert_eq!(
            response.header_str("www-authenticate"),
            Some("Bearer error=\"invalid_token\", error_description=\"The token is expired\"")
        );
    }

    #[test]
    fn test_forbidden_has_no_challenge() {
        let response = AuthError::access_denied("Admin role required").into_response();
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert!(response.header_str("www-authenticate").is_none());
    }
}
