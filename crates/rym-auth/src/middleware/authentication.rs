//! Authentication stage
//!
//! Runs the registered [`Authenticator`] and stores the resulting
//! [`Principal`] in the request extensions. It never rejects a request:
//! anonymous callers and callers with unusable tokens continue as anonymous,
//! and the authorization stage decides whether that is acceptable.

use std::sync::Arc;

use rym_http::{Middleware, Next, NextFuture, Principal, RymRequest};

use crate::traits::Authenticator;
use crate::AuthError;

/// Why credentials present on the request were not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationFailure(pub AuthError);

#[derive(Clone)]
pub struct AuthenticationMiddleware {
    authenticator: Arc<dyn Authenticator>,
}

impl AuthenticationMiddleware {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl std::fmt::Debug for AuthenticationMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationMiddleware")
            .field("scheme", &self.authenticator.scheme())
            .finish()
    }
}

impl Middleware for AuthenticationMiddleware {
    fn handle(&self, mut request: RymRequest, next: Next) -> NextFuture<'static> {
        let authenticator = self.authenticator.clone();
        Box::pin(async move {
            match authenticator.authenticate(&request).await {
                Ok(Some(principal)) => {
                    tracing::debug!(
                        subject = %principal.subject,
                        scheme = authenticator.scheme(),
                        "Request authenticated"
                    );
                    request.insert_extension::<Principal>(principal);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::info!(scheme = authenticator.scheme(), error = %error, "Credentials rejected");
                    request.insert_extension(AuthenticationFailure(error));
                }
            }
            next.run(request).await
        })
    }

    fn name(&self) -> &'static str {
        "Authentication"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthResult;
    use async_trait::async_trait;
    use rym_http::http::{HeaderMap, Method, Uri};
    use rym_http::{MiddlewarePipeline, RymResponse};

    /// Accepts `Bearer ok`, rejects any other bearer token
    struct FixedAuthenticator;

    #[async_trait]
    impl Authenticator for FixedAuthenticator {
        async fn authenticate(&self, request: &RymRequest) -> AuthResult<Option<Principal>> {
            match request.header_str("authorization") {
                Some("Bearer ok") => Ok(Some(Principal::new("1", "Bearer"))),
                Some(_) => Err(AuthError::token_error("bad")),
                None => Ok(None),
            }
        }

        fn scheme(&self) -> &'static str {
            "Bearer"
        }
    }

    async fn observe(authorization: Option<&str>) -> (Option<Principal>, Option<AuthenticationFailure>) {
        let pipeline = MiddlewarePipeline::new().add(AuthenticationMiddleware::new(Arc::new(FixedAuthenticator)));
        let mut request = RymRequest::new(Method::GET, Uri::from_static("/"), HeaderMap::new());
        if let Some(value) = authorization {
            request = request.with_header("authorization", value);
        }

        let seen = Arc::new(std::sync::Mutex::new(None));
        let sink = seen.clone();
        let response = pipeline
            .execute(request, move |request| {
                *sink.lock().unwrap() = Some((
                    request.extension::<Principal>().cloned(),
                    request.extension::<AuthenticationFailure>().cloned(),
                ));
                async { RymResponse::ok() }
            })
            .await;
        assert!(response.status_code().is_success());
        let observed = seen.lock().unwrap().take().unwrap();
        observed
    }

    #[tokio::test]
    async fn test_principal_is_stored() {
        let (principal, failure) = observe(Some("Bearer ok")).await;
        assert_eq!(principal.unwrap().subject, "1");
        assert!(failure.is_none());
    }

    #[tokio::test]
    async fn test_anonymous_and_invalid_continue() {
        assert_eq!(observe(None).await, (None, None));

        let (principal, failure) = observe(Some("Bearer nope")).await;
        assert!(principal.is_none());
        assert_eq!(failure, Some(AuthenticationFailure(AuthError::token_error("bad"))));
    }
}
