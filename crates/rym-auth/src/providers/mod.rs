pub mod jwt;

pub use jwt::{JwtAuthenticator, BEARER_SCHEME};
