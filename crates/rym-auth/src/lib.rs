//! # rym-auth
//!
//! Bearer authentication and endpoint authorization:
//! - the [`Authenticator`] seam and its JWT implementation
//! - authentication and authorization pipeline stages
//! - service collection and application builder extensions

pub mod config;
pub mod error;
pub mod integration;
pub mod middleware;
pub mod providers;
pub mod traits;

pub use config::JwtSettings;
pub use error::AuthError;
pub use integration::{AuthApplicationBuilderExt, AuthServiceCollectionExt};
pub use middleware::{AuthenticationFailure, AuthenticationMiddleware, AuthorizationMiddleware};
pub use providers::jwt::{JwtAuthenticator, BEARER_SCHEME};
pub use traits::Authenticator;

/// Authentication result type alias
pub type AuthResult<T> = Result<T, AuthError>;
