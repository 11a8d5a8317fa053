use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use super::metadata::EndpointMetadata;
use super::pattern::{PathSegment, RoutePattern};
use crate::controller::{join_paths, ControllerRegistry, Handler};
use crate::errors::{HttpError, HttpResult};

/// An executable route with its resolved metadata
pub struct Endpoint {
    pub method: Method,
    pub pattern: RoutePattern,
    pub handler: Handler,
    pub metadata: EndpointMetadata,
    pub controller: &'static str,
}

impl Endpoint {
    /// `Controller.Action`, or `METHOD /template` for unnamed routes
    pub fn display_name(&self) -> String {
        match &self.metadata.name {
            Some(name) => format!("{}.{}", self.controller, name),
            None => format!("{} {}", self.method, self.pattern.template()),
        }
    }

    /// Literal segments outrank constrained parameters, which outrank
    /// free parameters
    fn precedence(&self) -> Vec<u8> {
        self.pattern
            .segments()
            .iter()
            .map(|segment| match segment {
                PathSegment::Static(_) => 0,
                PathSegment::Parameter { constraint, .. } if *constraint != super::ParamConstraint::None => 1,
                PathSegment::Parameter { .. } => 2,
            })
            .collect()
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("template", &self.pattern.template())
            .field("controller", &self.controller)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Endpoint selected for the current request, stored in the request
/// extensions by the routing stage
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub endpoint: Arc<Endpoint>,
    pub params: HashMap<String, String>,
}

#[derive(Debug)]
pub enum RouteLookup {
    Matched(RouteMatch),
    /// The path exists but not for this method
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

#[derive(Debug, Default)]
pub struct RouteTable {
    endpoints: Vec<Arc<Endpoint>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every controller route. Ambiguous routes are a startup error.
    pub fn from_controllers(registry: &ControllerRegistry) -> HttpResult<Self> {
        let mut table = Self::new();
        for controller in registry.controllers() {
            let name = controller.name();
            let base = controller.base_path().to_string();
            let default_requirement = controller.authorization();

            for route in controller.clone().routes() {
                let path = join_paths(&base, &route.path);
                let pattern = RoutePattern::parse(&path).map_err(|e| {
                    HttpError::config(format!("Invalid route '{}' on {}: {}", path, name, e))
                })?;
                let mut metadata = route.metadata;
                metadata.authorization = route
                    .authorization
                    .unwrap_or_else(|| default_requirement.clone());
                if metadata.tags.is_empty() {
                    metadata.tags.push(name.to_string());
                }

                table.add(Endpoint {
                    method: route.method,
                    pattern,
                    handler: route.handler,
                    metadata,
                    controller: name,
                })?;
            }
        }

        tracing::debug!(endpoints = table.len(), "Route table built");
        Ok(table)
    }

    pub fn add(&mut self, endpoint: Endpoint) -> HttpResult<()> {
        if let Some(existing) = self
            .endpoints
            .iter()
            .find(|e| e.method == endpoint.method && e.pattern.is_equivalent(&endpoint.pattern))
        {
            return Err(HttpError::config(format!(
                "Ambiguous route {} {}: matches both {} and {}",
                endpoint.method,
                endpoint.pattern.template(),
                existing.display_name(),
                endpoint.display_name()
            )));
        }
        self.endpoints.push(Arc::new(endpoint));
        Ok(())
    }

    pub fn lookup(&self, method: &Method, path: &str) -> RouteLookup {
        let mut best: Option<(Vec<u8>, RouteMatch)> = None;
        let mut allowed = Vec::new();

        for endpoint in &self.endpoints {
            let Some(params) = endpoint.pattern.match_path(path) else {
                continue;
            };
            if endpoint.method != *method {
                if !allowed.contains(&endpoint.method) {
                    allowed.push(endpoint.method.clone());
                }
                continue;
            }
            let precedence = endpoint.precedence();
            if best.as_ref().map_or(true, |(current, _)| precedence < *current) {
                best = Some((
                    precedence,
                    RouteMatch {
                        endpoint: endpoint.clone(),
                        params,
                    },
                ));
            }
        }

        match best {
            Some((_, matched)) => RouteLookup::Matched(matched),
            None if !allowed.is_empty() => RouteLookup::MethodNotAllowed(allowed),
            None => RouteLookup::NotFound,
        }
    }

    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, RouteDefinition};
    use crate::response::RymResponse;
    use crate::routing::AuthorizationRequirement;

    struct Orders;

    impl Controller for Orders {
        fn name(&self) -> &'static str {
            "Orders"
        }

        fn base_path(&self) -> &str {
            "/api/orders"
        }

        fn authorization(&self) -> AuthorizationRequirement {
            AuthorizationRequirement::Authenticated
        }

        fn routes(self: Arc<Self>) -> Vec<RouteDefinition> {
            vec![
                RouteDefinition::get("{id}", |_, _| async { Ok(RymResponse::ok()) }).name("ByCode"),
                RouteDefinition::get("{id:int}", |_, _| async { Ok(RymResponse::ok()) }).name("ById"),
                RouteDefinition::get("pending", |_, _| async { Ok(RymResponse::ok()) })
                    .name("Pending")
                    .allow_anonymous(),
                RouteDefinition::post("", |_, _| async { Ok(RymResponse::ok()) }).name("Create"),
            ]
        }
    }

    struct Duplicate;

    impl Controller for Duplicate {
        fn name(&self) -> &'static str {
            "Duplicate"
        }

        fn base_path(&self) -> &str {
            "api/orders"
        }

        fn routes(self: Arc<Self>) -> Vec<RouteDefinition> {
            vec![RouteDefinition::post("/", |_, _| async { Ok(RymResponse::ok()) })]
        }
    }

    fn table() -> RouteTable {
        RouteTable::from_controllers(&ControllerRegistry::new().with(Orders)).unwrap()
    }

    fn matched_name(lookup: RouteLookup) -> String {
        match lookup {
            RouteLookup::Matched(m) => m.endpoint.display_name(),
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let table = table();
        assert_eq!(matched_name(table.lookup(&Method::GET, "/api/orders/pending")), "Orders.Pending");
        assert_eq!(matched_name(table.lookup(&Method::GET, "/api/orders/12")), "Orders.ById");
        assert_eq!(matched_name(table.lookup(&Method::GET, "/api/orders/AB-12")), "Orders.ByCode");
    }

    #[test]
    fn test_params_captured() {
        match table().lookup(&Method::GET, "/api/orders/12") {
            RouteLookup::Matched(m) => assert_eq!(m.params["id"], "12"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_method_not_allowed() {
        match table().lookup(&Method::DELETE, "/api/orders") {
            RouteLookup::MethodNotAllowed(allowed) => assert_eq!(allowed, vec![Method::POST]),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(table().lookup(&Method::GET, "/api/nothing"), RouteLookup::NotFound));
    }

    #[test]
    fn test_authorization_inherited_from_controller() {
        let table = table();
        let by_name = |name: &str| {
            table
                .endpoints()
                .iter()
                .find(|e| e.metadata.name.as_deref() == Some(name))
                .map(|e| e.metadata.authorization.clone())
                .unwrap()
        };
        assert_eq!(by_name("Create"), AuthorizationRequirement::Authenticated);
        assert_eq!(by_name("Pending"), AuthorizationRequirement::Anonymous);
    }

    #[test]
    fn test_default_tag_is_controller_name() {
        assert!(table()
            .endpoints()
            .iter()
            .all(|e| e.metadata.tags == vec!["Orders".to_string()]));
    }

    #[test]
    fn test_ambiguous_routes_rejected() {
        let registry = ControllerRegistry::new().with(Orders).with(Duplicate);
        let err = RouteTable::from_controllers(&registry).unwrap_err();
        assert!(err.to_string().contains("Ambiguous route POST /api/orders"));
    }
}
