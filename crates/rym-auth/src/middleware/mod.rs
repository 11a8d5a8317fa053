//! Authentication and authorization pipeline stages

pub mod authentication;
pub mod authorization;

pub use authentication::{AuthenticationFailure, AuthenticationMiddleware};
pub use authorization::AuthorizationMiddleware;
