//! Authentication seam

use async_trait::async_trait;
use rym_http::{Principal, RymRequest};

use crate::AuthResult;

/// Establishes the caller identity for a request.
///
/// `Ok(None)` means the request carries no credentials for this scheme;
/// `Err` means credentials were present but invalid.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, request: &RymRequest) -> AuthResult<Option<Principal>>;

    /// Scheme name used in challenges and logs, e.g. `Bearer`
    fn scheme(&self) -> &'static str;
}

/// Token from an `Authorization: <scheme> <token>` header. The scheme
/// comparison is case-insensitive.
pub fn extract_credentials<'a>(request: &'a RymRequest, scheme: &str) -> Option<&'a str> {
    let header = request.header_str("authorization")?.trim();
    let (given, token) = header.split_once(' ')?;
    if !given.eq_ignore_ascii_case(scheme) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
