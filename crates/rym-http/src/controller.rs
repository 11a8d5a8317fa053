//! Controllers group related endpoints under a base path.
//!
//! A controller hands out [`RouteDefinition`]s; each carries a boxed async
//! handler plus metadata. Handlers receive the [`HttpContext`] built for the
//! matched endpoint and the request itself.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::Method;

use crate::context::HttpContext;
use crate::errors::HttpResult;
use crate::request::RymRequest;
use crate::response::RymResponse;
use crate::routing::{AuthorizationRequirement, EndpointMetadata};

pub type HandlerFuture = Pin<Box<dyn Future<Output = HttpResult<RymResponse>> + Send>>;

/// Type-erased endpoint handler
pub type Handler = Arc<dyn Fn(HttpContext, RymRequest) -> HandlerFuture + Send + Sync>;

pub trait Controller: Send + Sync {
    /// Controller name, e.g. `Status`
    fn name(&self) -> &'static str;

    /// Path prefix shared by every route, e.g. `/api/status`
    fn base_path(&self) -> &str;

    /// Requirement applied to routes that do not set their own
    fn authorization(&self) -> AuthorizationRequirement {
        AuthorizationRequirement::Anonymous
    }

    fn routes(self: Arc<Self>) -> Vec<RouteDefinition>;
}

/// One endpoint declared by a controller
pub struct RouteDefinition {
    pub method: Method,
    /// Path relative to the controller base path
    pub path: String,
    pub handler: Handler,
    pub metadata: EndpointMetadata,
    /// `None` inherits the controller requirement
    pub authorization: Option<AuthorizationRequirement>,
}

impl RouteDefinition {
    pub fn new<F, Fut>(method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(HttpContext, RymRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<RymResponse>> + Send + 'static,
    {
        Self {
            method,
            path: path.to_string(),
            handler: Arc::new(move |context, request| Box::pin(handler(context, request))),
            metadata: EndpointMetadata::default(),
            authorization: None,
        }
    }

    pub fn get<F, Fut>(path: &str, handler: F) -> Self
    where
        F: Fn(HttpContext, RymRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<RymResponse>> + Send + 'static,
    {
        Self::new(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(path: &str, handler: F) -> Self
    where
        F: Fn(HttpContext, RymRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<RymResponse>> + Send + 'static,
    {
        Self::new(Method::POST, path, handler)
    }

    pub fn put<F, Fut>(path: &str, handler: F) -> Self
    where
        F: Fn(HttpContext, RymRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<RymResponse>> + Send + 'static,
    {
        Self::new(Method::PUT, path, handler)
    }

    pub fn delete<F, Fut>(path: &str, handler: F) -> Self
    where
        F: Fn(HttpContext, RymRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<RymResponse>> + Send + 'static,
    {
        Self::new(Method::DELETE, path, handler)
    }

    pub fn name(mut self, name: &str) -> Self {
        self.metadata.name = Some(name.to_string());
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.metadata.summary = Some(summary.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.metadata.description = Some(description.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.metadata.tags.push(tag.to_string());
        self
    }

    /// Require an authenticated caller
    pub fn authorize(mut self) -> Self {
        self.authorization = Some(AuthorizationRequirement::Authenticated);
        self
    }

    /// Require a caller in at least one of `roles`
    pub fn authorize_roles(mut self, roles: &[&str]) -> Self {
        self.authorization = Some(AuthorizationRequirement::roles(roles.iter().copied()));
        self
    }

    /// Open the route even when the controller requires authentication
    pub fn allow_anonymous(mut self) -> Self {
        self.authorization = Some(AuthorizationRequirement::Anonymous);
        self
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("authorization", &self.authorization)
            .finish_non_exhaustive()
    }
}

/// The application's controllers, in registration order
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    controllers: Vec<Arc<dyn Controller>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<C: Controller + 'static>(mut self, controller: C) -> Self {
        self.add(Arc::new(controller));
        self
    }

    pub fn add(&mut self, controller: Arc<dyn Controller>) {
        self.controllers.push(controller);
    }

    pub fn controllers(&self) -> &[Arc<dyn Controller>] {
        &self.controllers
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.controllers.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.names())
            .finish()
    }
}

/// Join a controller base path and a route path
pub(crate) fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_matches('/');
    let path = path.trim_matches('/');
    match (base.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", path),
        (false, true) => format!("/{}", base),
        (false, false) => format!("/{}/{}", base, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Workshop;

    impl Controller for Workshop {
        fn name(&self) -> &'static str {
            "Workshop"
        }

        fn base_path(&self) -> &str {
            "/api/workshop"
        }

        fn authorization(&self) -> AuthorizationRequirement {
            AuthorizationRequirement::Authenticated
        }

        fn routes(self: Arc<Self>) -> Vec<RouteDefinition> {
            vec![
                RouteDefinition::get("", |_, _| async { Ok(RymResponse::ok()) })
                    .name("List")
                    .allow_anonymous(),
                RouteDefinition::delete("{id:int}", |_, _| async { Ok(RymResponse::no_content()) })
                    .authorize_roles(&["Admin"]),
            ]
        }
    }

    #[test]
    fn test_route_builders() {
        let routes = Arc::new(Workshop).routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].method, Method::GET);
        assert_eq!(routes[0].metadata.name.as_deref(), Some("List"));
        assert_eq!(routes[0].authorization, Some(AuthorizationRequirement::Anonymous));
        assert_eq!(
            routes[1].authorization,
            Some(AuthorizationRequirement::roles(["Admin"]))
        );
    }

    #[test]
    fn test_registry() {
        let registry = ControllerRegistry::new().with(Workshop);
        assert_eq!(registry.names(), vec!["Workshop"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/api/status/", ""), "/api/status");
        assert_eq!(join_paths("api/status", "/me"), "/api/status/me");
        assert_eq!(join_paths("", ""), "/");
        assert_eq!(join_paths("", "health"), "/health");
    }
}
