//! Registration of CORS policies and the CORS pipeline stage

use std::sync::Arc;

use rym_core::ServiceCollection;
use rym_http::{ApplicationBuilder, HttpError, HttpResult, Middleware, StageKind};

use crate::config::CorsOptions;
use crate::middleware::cors::CorsMiddleware;
use crate::SecurityResult;

pub trait CorsServiceCollectionExt {
    /// Register named CORS policies. A later call replaces the policies of
    /// an earlier one.
    fn add_cors<F>(&mut self, configure: F) -> SecurityResult<&mut Self>
    where
        F: FnOnce(&mut CorsOptions) -> SecurityResult<()>;
}

impl CorsServiceCollectionExt for ServiceCollection {
    fn add_cors<F>(&mut self, configure: F) -> SecurityResult<&mut Self>
    where
        F: FnOnce(&mut CorsOptions) -> SecurityResult<()>,
    {
        let mut options = CorsOptions::new();
        configure(&mut options)?;
        tracing::debug!(policies = ?options.policy_names(), "CORS policies registered");
        self.add_singleton(options);
        Ok(self)
    }
}

pub trait CorsApplicationBuilderExt {
    /// Add the CORS stage applying the named policy
    fn use_cors(&mut self, policy: &str) -> HttpResult<&mut Self>;
}

impl CorsApplicationBuilderExt for ApplicationBuilder {
    fn use_cors(&mut self, policy: &str) -> HttpResult<&mut Self> {
        let options = self.services().try_resolve::<CorsOptions>()?.ok_or_else(|| {
            HttpError::pipeline("use_cors needs CORS policies registered with add_cors")
        })?;
        let cors_policy = options
            .get_policy(policy)
            .map_err(|e| HttpError::pipeline(e.to_string()))?
            .clone();

        let middleware = CorsMiddleware::new(policy, cors_policy);
        self.use_stage(StageKind::Cors, "Cors", move |_| {
            Ok(Arc::new(middleware) as Arc<dyn Middleware>)
        })
    }
}
