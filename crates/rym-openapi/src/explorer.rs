//! Endpoint discovery for documentation
//!
//! The explorer walks the registered controllers once and keeps a
//! description of every endpoint: method, path template, path parameters
//! and the metadata declared on the route.

use rym_http::routing::ParamConstraint;
use rym_http::{AuthorizationRequirement, ControllerRegistry, EndpointMetadata, RouteTable};

use crate::error::{OpenApiError, OpenApiResult};

/// A path parameter of an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiParameter {
    pub name: String,
    pub constraint: ParamConstraint,
}

/// One documented endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDescription {
    /// Lower-case HTTP method
    pub method: String,
    /// Path template such as `/api/orders/{id}`
    pub path: String,
    pub controller: String,
    pub parameters: Vec<ApiParameter>,
    pub metadata: EndpointMetadata,
}

impl ApiDescription {
    pub fn authorization(&self) -> &AuthorizationRequirement {
        &self.metadata.authorization
    }

    /// `Controller_Name` when the route is named
    pub fn operation_id(&self) -> Option<String> {
        self.metadata
            .name
            .as_ref()
            .map(|name| format!("{}_{}", self.controller, name))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiExplorer {
    descriptions: Vec<ApiDescription>,
}

impl ApiExplorer {
    pub fn from_controllers(registry: &ControllerRegistry) -> OpenApiResult<Self> {
        let table = RouteTable::from_controllers(registry).map_err(OpenApiError::route_discovery_error)?;
        Ok(Self::from_route_table(&table))
    }

    pub fn from_route_table(table: &RouteTable) -> Self {
        let mut descriptions: Vec<ApiDescription> = table
            .endpoints()
            .iter()
            .map(|endpoint| ApiDescription {
                method: endpoint.method.as_str().to_ascii_lowercase(),
                path: endpoint.pattern.template(),
                controller: endpoint.controller.to_string(),
                parameters: endpoint
                    .pattern
                    .parameters()
                    .map(|(name, constraint)| ApiParameter {
                        name: name.to_string(),
                        constraint,
                    })
                    .collect(),
                metadata: endpoint.metadata.clone(),
            })
            .collect();
        descriptions.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.cmp(&b.method)));

        tracing::debug!(endpoints = descriptions.len(), "API explorer built");
        Self { descriptions }
    }

    pub fn descriptions(&self) -> &[ApiDescription] {
        &self.descriptions
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}
