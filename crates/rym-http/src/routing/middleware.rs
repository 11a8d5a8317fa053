use std::sync::Arc;

use axum::http::Method;

use super::table::{RouteLookup, RouteTable};
use crate::middleware::{Middleware, Next, NextFuture};
use crate::request::RymRequest;

/// Recorded by the routing stage when no endpoint can serve the request
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMiss {
    NotFound,
    MethodNotAllowed(Vec<Method>),
}

/// Selects the endpoint for a request without executing it.
///
/// Stages between routing and endpoints (authorization) read the selected
/// [`super::RouteMatch`] from the request extensions.
#[derive(Debug, Clone)]
pub struct RoutingMiddleware {
    routes: Arc<RouteTable>,
}

impl RoutingMiddleware {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes }
    }
}

impl Middleware for RoutingMiddleware {
    fn handle(&self, mut request: RymRequest, next: Next) -> NextFuture<'static> {
        match self.routes.lookup(&request.method, request.path()) {
            RouteLookup::Matched(route) => {
                tracing::debug!(endpoint = %route.endpoint.display_name(), "Endpoint selected");
                request.insert_extension(route);
            }
            RouteLookup::MethodNotAllowed(allowed) => {
                request.insert_extension(RouteMiss::MethodNotAllowed(allowed));
            }
            RouteLookup::NotFound => {
                request.insert_extension(RouteMiss::NotFound);
            }
        }

        Box::pin(async move { next.run(request).await })
    }

    fn name(&self) -> &'static str {
        "Routing"
    }
}
