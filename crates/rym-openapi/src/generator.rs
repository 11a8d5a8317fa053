use std::collections::BTreeSet;
use std::sync::Arc;

use rym_http::routing::ParamConstraint;
use rym_http::AuthorizationRequirement;

use crate::config::SwaggerGenOptions;
use crate::error::{OpenApiError, OpenApiResult};
use crate::explorer::{ApiDescription, ApiExplorer};
use crate::specification::*;

/// Builds OpenAPI documents from the explorer and the generation options
#[derive(Debug, Clone)]
pub struct SwaggerGenerator {
    options: Arc<SwaggerGenOptions>,
    explorer: Arc<ApiExplorer>,
}

impl SwaggerGenerator {
    pub fn new(options: Arc<SwaggerGenOptions>, explorer: Arc<ApiExplorer>) -> Self {
        Self { options, explorer }
    }

    pub fn options(&self) -> &SwaggerGenOptions {
        &self.options
    }

    /// Generate the document registered under `document_name`
    pub fn generate(&self, document_name: &str) -> OpenApiResult<OpenApiSpec> {
        let info = self.options.document(document_name)?;
        let mut spec = OpenApiSpec::new(info.clone());

        let mut tags = BTreeSet::new();
        for description in self.explorer.descriptions() {
            let path_item = spec.paths.entry(description.path.clone()).or_default();
            let slot = path_item.operation_mut(&description.method).ok_or_else(|| {
                OpenApiError::route_discovery_error(format!(
                    "Unsupported HTTP method '{}' on {}",
                    description.method, description.path
                ))
            })?;
            tags.extend(description.metadata.tags.iter().cloned());
            *slot = Some(self.create_operation(description));
        }

        if !self.options.security_schemes().is_empty() {
            spec.components = Some(Components {
                security_schemes: self.options.security_schemes().clone(),
            });
        }
        spec.security = self.options.security_requirements().to_vec();
        spec.tags = tags
            .into_iter()
            .map(|name| Tag { name, description: None })
            .collect();

        tracing::debug!(
            document = document_name,
            paths = spec.paths.len(),
            "OpenAPI document generated"
        );
        Ok(spec)
    }

    fn create_operation(&self, description: &ApiDescription) -> Operation {
        let metadata = &description.metadata;
        let mut responses = std::collections::BTreeMap::new();
        responses.insert("200".to_string(), Response::new("Success"));

        let requirement = description.authorization();
        if requirement.requires_authentication() {
            responses.insert("401".to_string(), Response::new("Unauthorized"));
        }
        if matches!(requirement, AuthorizationRequirement::Roles(_)) {
            responses.insert("403".to_string(), Response::new("Forbidden"));
        }

        // Anonymous endpoints opt out of the document-wide requirement
        let security = (!requirement.requires_authentication() && !self.options.security_requirements().is_empty())
            .then(Vec::new);

        Operation {
            tags: metadata.tags.clone(),
            summary: metadata.summary.clone(),
            description: metadata.description.clone(),
            operation_id: description.operation_id(),
            parameters: description
                .parameters
                .iter()
                .map(|parameter| Parameter {
                    name: parameter.name.clone(),
                    location: "path".to_string(),
                    description: None,
                    required: true,
                    schema: Some(parameter_schema(parameter.constraint)),
                })
                .collect(),
            responses,
            security,
        }
    }
}

fn parameter_schema(constraint: ParamConstraint) -> Schema {
    let (schema_type, format) = constraint.schema_type();
    Schema {
        schema_type: Some(schema_type.to_string()),
        format: format.map(str::to_string),
        pattern: (constraint == ParamConstraint::Alpha).then(|| "^[a-zA-Z]+$".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rym_http::{Controller, ControllerRegistry, RouteDefinition, RymResponse};
    use serde_json::Value;

    struct Services;

    impl Controller for Services {
        fn name(&self) -> &'static str {
            "Services"
        }

        fn base_path(&self) -> &str {
            "/api/services"
        }

        fn routes(self: Arc<Self>) -> Vec<RouteDefinition> {
            vec![
                RouteDefinition::get("", |_, _| async { Ok(RymResponse::ok()) }).summary("List services"),
                RouteDefinition::put("{id:guid}", |_, _| async { Ok(RymResponse::ok()) })
                    .name("Update")
                    .authorize_roles(&["Admin"]),
            ]
        }
    }

    fn generator(secured: bool) -> SwaggerGenerator {
        let mut options = SwaggerGenOptions::new();
        options
            .swagger_doc("v1", ApiInfo::new("Lubricentro", "v1").with_description("Docs"))
            .unwrap();
        if secured {
            options.add_security_definition("Bearer", SecurityScheme::api_key_header("Authorization"));
            options
                .add_security_requirement([("Bearer".to_string(), Vec::new())].into_iter().collect())
                .unwrap();
        }
        let explorer = ApiExplorer::from_controllers(&ControllerRegistry::new().with(Services)).unwrap();
        SwaggerGenerator::new(Arc::new(options), Arc::new(explorer))
    }

    #[test]
    fn test_generated_document() {
        let spec = generator(true).generate("v1").unwrap();
        let json: Value = serde_json::from_slice(&spec.to_json().unwrap()).unwrap();

        assert_eq!(json["openapi"], "3.0.1");
        assert_eq!(json["info"]["title"], "Lubricentro");
        assert_eq!(json["components"]["securitySchemes"]["Bearer"]["type"], "apiKey");
        assert_eq!(json["security"][0]["Bearer"], serde_json::json!([]));
        assert_eq!(json["tags"][0]["name"], "Services");

        let list = &json["paths"]["/api/services"]["get"];
        assert_eq!(list["summary"], "List services");
        assert_eq!(list["security"], serde_json::json!([]));
        assert!(list["responses"]["401"].is_null());

        let update = &json["paths"]["/api/services/{id}"]["put"];
        assert_eq!(update["operationId"], "Services_Update");
        assert_eq!(update["parameters"][0]["in"], "path");
        assert_eq!(update["parameters"][0]["schema"]["format"], "uuid");
        assert_eq!(update["responses"]["403"]["description"], "Forbidden");
        assert!(update.get("security").is_none());
    }

    #[test]
    fn test_unsecured_document() {
        let spec = generator(false).generate("v1").unwrap();
        assert!(spec.components.is_none());
        assert!(spec.security.is_empty());
        let list = spec.paths["/api/services"].get.as_ref().unwrap();
        assert!(list.security.is_none());
    }

    #[test]
    fn test_unknown_document() {
        assert!(matches!(
            generator(true).generate("v2"),
            Err(OpenApiError::UnknownDocument(_))
        ));
    }

    #[test]
    fn test_yaml_export() {
        let yaml = generator(true).generate("v1").unwrap().to_yaml().unwrap();
        assert!(yaml.contains("title: Lubricentro"));
    }
}
