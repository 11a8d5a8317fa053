//! Authorization stage
//!
//! Enforces the [`AuthorizationRequirement`] of the endpoint chosen by
//! routing. Requests routing did not match pass through untouched so the
//! endpoint stage can answer 404 or 405.

use rym_http::{AuthorizationRequirement, Middleware, Next, NextFuture, Principal, RouteMatch, RymRequest};

use crate::middleware::authentication::AuthenticationFailure;
use crate::AuthError;

#[derive(Debug, Clone, Default)]
pub struct AuthorizationMiddleware;

impl AuthorizationMiddleware {
    pub fn new() -> Self {
        Self
    }

    fn evaluate(request: &RymRequest, requirement: &AuthorizationRequirement) -> Result<(), AuthError> {
        if !requirement.requires_authentication() {
            return Ok(());
        }

        let Some(principal) = request.extension::<Principal>() else {
            return Err(match request.extension::<AuthenticationFailure>() {
                Some(AuthenticationFailure(error)) => error.clone(),
                None => AuthError::AuthenticationRequired,
            });
        };

        let roles = requirement.required_roles();
        if !roles.is_empty() && !principal.has_any_role(roles) {
            return Err(AuthError::access_denied(format!(
                "One of the roles [{}] is required",
                roles.join(", ")
            )));
        }
        Ok(())
    }
}

impl Middleware for AuthorizationMiddleware {
    fn handle(&self, request: RymRequest, next: Next) -> NextFuture<'static> {
        let Some(route) = request.extension::<RouteMatch>() else {
            return Box::pin(async move { next.run(request).await });
        };

        if let Err(error) = Self::evaluate(&request, &route.endpoint.metadata.authorization) {
            tracing::info!(
                endpoint = %route.endpoint.display_name(),
                status = error.status_code().as_u16(),
                reason = %error,
                "Request not authorized"
            );
            let response = error.into_response();
            return Box::pin(async move { response });
        }

        Box::pin(async move { next.run(request).await })
    }

    fn name(&self) -> &'static str {
        "Authorization"
    }
}
