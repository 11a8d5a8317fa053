use std::sync::Arc;

use rym_core::Container;

use crate::context::{HttpContext, HttpContextAccessor};
use crate::json::JsonOptions;
use crate::middleware::{Middleware, Next, NextFuture};
use crate::request::RymRequest;
use crate::response::RymResponse;
use crate::routing::{RouteMatch, RouteMiss};

/// Terminal stage: executes the endpoint chosen by the routing stage.
///
/// Requests routing could not match fall through to `next`, which answers
/// 404 at the end of the pipeline; a path that exists under other methods
/// gets 405 with an `Allow` header.
#[derive(Debug, Clone)]
pub struct EndpointMiddleware {
    services: Arc<Container>,
    json: JsonOptions,
}

impl EndpointMiddleware {
    pub fn new(services: Arc<Container>, json: JsonOptions) -> Self {
        Self { services, json }
    }
}

impl Middleware for EndpointMiddleware {
    fn handle(&self, request: RymRequest, next: Next) -> NextFuture<'static> {
        let Some(route) = request.extension::<RouteMatch>().cloned() else {
            if let Some(RouteMiss::MethodNotAllowed(allowed)) = request.extension::<RouteMiss>() {
                let response = RymResponse::method_not_allowed(allowed);
                return Box::pin(async move { response });
            }
            return Box::pin(async move { next.run(request).await });
        };

        let context = HttpContext::new(&request, &route, self.services.clone(), self.json);
        let handler = route.endpoint.handler.clone();

        Box::pin(async move {
            let endpoint = context.endpoint().to_string();
            let result = HttpContextAccessor::scope(context.clone(), handler(context, request)).await;
            match result {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!(endpoint = %endpoint, error = %error, "Endpoint returned an error");
                    error.into_response()
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "Endpoints"
    }
}
