//! Per-request context handed to endpoint handlers, and an accessor that
//! exposes it to code running inside a handler without threading it through
//! every call.

use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use rym_core::Container;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{HttpError, HttpResult};
use crate::identity::Principal;
use crate::json::JsonOptions;
use crate::request::RymRequest;
use crate::response::RymResponse;
use crate::routing::RouteMatch;

/// Correlation id assigned to every request on entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceIdentifier(pub String);

impl TraceIdentifier {
    pub fn generate() -> Self {
        TraceIdentifier(uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct HttpContext {
    trace_identifier: String,
    method: Method,
    path: String,
    endpoint: String,
    route_values: HashMap<String, String>,
    user: Option<Principal>,
    services: Arc<Container>,
    json: JsonOptions,
}

impl HttpContext {
    pub fn new(request: &RymRequest, route: &RouteMatch, services: Arc<Container>, json: JsonOptions) -> Self {
        Self {
            trace_identifier: request
                .extension::<TraceIdentifier>()
                .map(|id| id.0.clone())
                .unwrap_or_else(|| TraceIdentifier::generate().0),
            method: request.method.clone(),
            path: request.path().to_string(),
            endpoint: route.endpoint.display_name(),
            route_values: route.params.clone(),
            user: request.extension::<Principal>().cloned(),
            services,
            json,
        }
    }

    pub fn trace_identifier(&self) -> &str {
        &self.trace_identifier
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Display name of the executing endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn route_value(&self, name: &str) -> Option<&str> {
        self.route_values.get(name).map(String::as_str)
    }

    /// Route value parsed into `T`; missing or malformed values are a 400
    pub fn route_value_as<T>(&self, name: &str) -> HttpResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self
            .route_value(name)
            .ok_or_else(|| HttpError::bad_request(format!("Missing route value '{}'", name)))?;
        raw.parse::<T>()
            .map_err(|e| HttpError::bad_request(format!("Invalid route value '{}': {}", name, e)))
    }

    pub fn user(&self) -> Option<&Principal> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn services(&self) -> &Arc<Container> {
        &self.services
    }

    /// Resolve a service from the application container
    pub fn resolve<T: Send + Sync + 'static>(&self) -> HttpResult<Arc<T>> {
        Ok(self.services.resolve::<T>()?)
    }

    pub fn json_options(&self) -> &JsonOptions {
        &self.json
    }

    /// 200 with `data` serialized by the application's JSON options
    pub fn ok<T: Serialize>(&self, data: &T) -> HttpResult<RymResponse> {
        RymResponse::json_with(&self.json, data)
    }

    pub fn json<T: Serialize>(&self, status: StatusCode, data: &T) -> HttpResult<RymResponse> {
        Ok(RymResponse::json_with(&self.json, data)?.status(status))
    }

    /// Deserialize the request body with the application's JSON options
    pub fn read_json<T: DeserializeOwned>(&self, request: &RymRequest) -> HttpResult<T> {
        request.json(&self.json)
    }
}

tokio::task_local! {
    static CURRENT_CONTEXT: HttpContext;
}

/// Reads the context of the request being handled on the current task.
///
/// The context is available while an endpoint handler runs. Work moved to a
/// separately spawned task does not inherit it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpContextAccessor;

impl HttpContextAccessor {
    pub fn new() -> Self {
        Self
    }

    pub fn current(&self) -> Option<HttpContext> {
        CURRENT_CONTEXT.try_with(HttpContext::clone).ok()
    }

    /// Run `future` with `context` as the current context
    pub async fn scope<F: Future>(context: HttpContext, future: F) -> F::Output {
        CURRENT_CONTEXT.scope(context, future).await
    }
}
