//! Document generation and Swagger endpoint options

use std::collections::BTreeMap;

use crate::error::{OpenApiError, OpenApiResult};
use crate::specification::{ApiInfo, SecurityRequirement, SecurityScheme};

pub const DOCUMENT_NAME_PLACEHOLDER: &str = "{documentName}";

/// What documents to generate and the security they declare
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwaggerGenOptions {
    documents: BTreeMap<String, ApiInfo>,
    security_schemes: BTreeMap<String, SecurityScheme>,
    security_requirements: Vec<SecurityRequirement>,
}

impl SwaggerGenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a document served under `name`, e.g. `v1`
    pub fn swagger_doc(&mut self, name: &str, info: ApiInfo) -> OpenApiResult<&mut Self> {
        if name.is_empty() || name.contains('/') {
            return Err(OpenApiError::config_error(format!(
                "Document name '{}' must be a non-empty path segment",
                name
            )));
        }
        if info.title.trim().is_empty() {
            return Err(OpenApiError::config_error(format!("Document '{}' needs a title", name)));
        }
        self.documents.insert(name.to_string(), info);
        Ok(self)
    }

    pub fn add_security_definition(&mut self, name: &str, scheme: SecurityScheme) -> &mut Self {
        self.security_schemes.insert(name.to_string(), scheme);
        self
    }

    /// Require a defined scheme on every operation that is not anonymous
    pub fn add_security_requirement(&mut self, requirement: SecurityRequirement) -> OpenApiResult<&mut Self> {
        if let Some(unknown) = requirement.keys().find(|name| !self.security_schemes.contains_key(*name)) {
            return Err(OpenApiError::config_error(format!(
                "Security requirement references undefined scheme '{}'",
                unknown
            )));
        }
        self.security_requirements.push(requirement);
        Ok(self)
    }

    pub fn document(&self, name: &str) -> OpenApiResult<&ApiInfo> {
        self.documents
            .get(name)
            .ok_or_else(|| OpenApiError::UnknownDocument(name.to_string()))
    }

    pub fn document_names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn security_schemes(&self) -> &BTreeMap<String, SecurityScheme> {
        &self.security_schemes
    }

    pub fn security_requirements(&self) -> &[SecurityRequirement] {
        &self.security_requirements
    }
}

/// Where generated documents are served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwaggerOptions {
    /// Must contain `{documentName}` and end in `.json`; the same path with
    /// `.yaml` serves the YAML form
    pub route_template: String,
}

impl Default for SwaggerOptions {
    fn default() -> Self {
        Self {
            route_template: "/swagger/{documentName}/swagger.json".to_string(),
        }
    }
}

impl SwaggerOptions {
    pub(crate) fn validate(&self) -> OpenApiResult<()> {
        if !self.route_template.contains(DOCUMENT_NAME_PLACEHOLDER) || !self.route_template.ends_with(".json") {
            return Err(OpenApiError::config_error(format!(
                "Route template '{}' must contain {} and end with .json",
                self.route_template, DOCUMENT_NAME_PLACEHOLDER
            )));
        }
        Ok(())
    }

    pub fn json_path(&self, document: &str) -> String {
        self.route_template.replace(DOCUMENT_NAME_PLACEHOLDER, document)
    }

    pub fn yaml_path(&self, document: &str) -> String {
        let json = self.json_path(document);
        format!("{}.yaml", json.trim_end_matches(".json"))
    }
}

/// Swagger UI page settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwaggerUiOptions {
    /// Path the UI is served under, without slashes
    pub route_prefix: String,
    pub document_title: String,
    /// `(url, label)` pairs shown in the document selector. Empty means one
    /// entry per generated document.
    pub endpoints: Vec<(String, String)>,
}

impl Default for SwaggerUiOptions {
    fn default() -> Self {
        Self {
            route_prefix: "swagger".to_string(),
            document_title: "Swagger UI".to_string(),
            endpoints: Vec::new(),
        }
    }
}

impl SwaggerUiOptions {
    pub fn swagger_endpoint(&mut self, url: &str, label: &str) -> &mut Self {
        self.endpoints.push((url.to_string(), label.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_registration() {
        let mut options = SwaggerGenOptions::new();
        options.swagger_doc("v1", ApiInfo::new("Taller", "v1")).unwrap();
        assert!(options.swagger_doc("v1/beta", ApiInfo::new("Taller", "v1")).is_err());
        assert!(options.swagger_doc("v2", ApiInfo::new(" ", "v2")).is_err());

        assert_eq!(options.document("v1").unwrap().title, "Taller");
        assert!(matches!(options.document("v3"), Err(OpenApiError::UnknownDocument(_))));
        assert_eq!(options.document_names().collect::<Vec<_>>(), vec!["v1"]);
    }

    #[test]
    fn test_requirement_needs_definition() {
        let mut options = SwaggerGenOptions::new();
        let requirement: SecurityRequirement = [("Bearer".to_string(), Vec::new())].into_iter().collect();
        assert!(options.add_security_requirement(requirement.clone()).is_err());

        options.add_security_definition("Bearer", SecurityScheme::http_bearer());
        options.add_security_requirement(requirement).unwrap();
        assert_eq!(options.security_requirements().len(), 1);
    }

    #[test]
    fn test_route_paths() {
        let options = SwaggerOptions::default();
        options.validate().unwrap();
        assert_eq!(options.json_path("v1"), "/swagger/v1/swagger.json");
        assert_eq!(options.yaml_path("v1"), "/swagger/v1/swagger.yaml");

        let broken = SwaggerOptions {
            route_template: "/docs/swagger.json".to_string(),
        };
        assert!(broken.validate().is_err());
    }
}
