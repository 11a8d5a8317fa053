//! Registration of the bearer authenticator and the auth pipeline stages

use std::sync::Arc;

use rym_core::ServiceCollection;
use rym_http::{ApplicationBuilder, HttpError, HttpResult, Middleware, StageKind};

use crate::config::JwtSettings;
use crate::middleware::{AuthenticationMiddleware, AuthorizationMiddleware};
use crate::providers::JwtAuthenticator;
use crate::traits::Authenticator;

pub trait AuthServiceCollectionExt {
    /// Register JWT bearer validation as the application's authenticator
    fn add_jwt_bearer(&mut self, settings: JwtSettings) -> &mut Self;
}

impl AuthServiceCollectionExt for ServiceCollection {
    fn add_jwt_bearer(&mut self, settings: JwtSettings) -> &mut Self {
        tracing::debug!(
            issuer = ?settings.issuer,
            audience = ?settings.audience,
            "Registering JWT bearer authentication"
        );
        let authenticator: Arc<dyn Authenticator> = Arc::new(JwtAuthenticator::new(&settings));
        self.add_singleton(settings);
        self.add_singleton(authenticator)
    }
}

pub trait AuthApplicationBuilderExt {
    /// Add the stage that establishes the caller identity
    fn use_authentication(&mut self) -> HttpResult<&mut Self>;

    /// Add the stage that enforces endpoint requirements. Must come after
    /// routing and authentication.
    fn use_authorization(&mut self) -> HttpResult<&mut Self>;
}

impl AuthApplicationBuilderExt for ApplicationBuilder {
    fn use_authentication(&mut self) -> HttpResult<&mut Self> {
        let authenticator = self
            .services()
            .try_resolve::<Arc<dyn Authenticator>>()?
            .ok_or_else(|| HttpError::pipeline("use_authentication needs an Authenticator registered, e.g. with add_jwt_bearer"))?;

        let middleware = AuthenticationMiddleware::new((*authenticator).clone());
        self.use_stage(StageKind::Authentication, "Authentication", move |_| {
            Ok(Arc::new(middleware) as Arc<dyn Middleware>)
        })
    }

    fn use_authorization(&mut self) -> HttpResult<&mut Self> {
        if !self.has_stage(StageKind::Authentication) {
            return Err(HttpError::pipeline(
                "The authorization stage must come after the authentication stage",
            ));
        }
        self.use_stage(StageKind::Authorization, "Authorization", |_| {
            Ok(Arc::new(AuthorizationMiddleware::new()) as Arc<dyn Middleware>)
        })
    }
}
