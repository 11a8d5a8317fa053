//! # Startup
//!
//! Composition root: service registration and the order of the request
//! pipeline.

use std::sync::Arc;

use rym_auth::AuthApplicationBuilderExt;
use rym_core::{Configuration, CoreResult, Environment, ServiceCollection};
use rym_http::{ApplicationBuilder, EscapePolicy, HttpResult, HttpServiceCollectionExt};
use rym_openapi::{ApiInfo, Contact, OpenApiApplicationBuilderExt, OpenApiServiceCollectionExt, SecurityScheme};
use rym_security::{CorsApplicationBuilderExt, CorsServiceCollectionExt};

use crate::{application, controllers, infrastructure};

/// Name of the CORS policy applied to every request
pub const CORS_POLICY: &str = "PermitirFrontend";

/// Name of the generated OpenAPI document
pub const API_DOCUMENT: &str = "v1";

const FRONTEND_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "https://bacosta30762.github.io",
];

#[derive(Debug, Clone)]
pub struct Startup {
    configuration: Arc<Configuration>,
}

impl Startup {
    pub fn new(configuration: Arc<Configuration>) -> Self {
        Self { configuration }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Register every service the pipeline and the controllers use
    pub fn configure_services(&self, services: &mut ServiceCollection) -> CoreResult<()> {
        services
            .add_controllers(controllers::registry())
            .add_json_options(|options| options.escape_policy = EscapePolicy::Relaxed);

        services.add_endpoints_api_explorer();
        services.add_swagger_gen(|options| {
            options.swagger_doc(
                API_DOCUMENT,
                ApiInfo::new("RyM Lubricentro API", "v1")
                    .with_description("Comprehensive RESTful API for mechanic shop service management system")
                    .with_contact(Contact {
                        name: Some("RyM Lubricentro".to_string()),
                        url: None,
                        email: Some("support@lubricentrorym.com".to_string()),
                    }),
            )?;
            options.add_security_definition(
                "Bearer",
                SecurityScheme::api_key_header("Authorization")
                    .with_scheme("Bearer")
                    .with_bearer_format("JWT")
                    .with_description("Introduce el token en el formato: Bearer {token}"),
            );
            options.add_security_requirement([("Bearer".to_string(), Vec::new())].into_iter().collect())?;
            Ok(())
        })?;

        infrastructure::add_infrastructure(services, &self.configuration)?;
        application::add_application(services)?;

        services.add_http_context_accessor();
        services.add_cors(|options| {
            options.add_policy(CORS_POLICY, |policy| {
                policy
                    .with_origins(FRONTEND_ORIGINS)
                    .allow_any_header()
                    .allow_any_method()
                    .allow_credentials()
            })?;
            Ok(())
        })?;

        tracing::info!(services = services.len(), "Services registered");
        Ok(())
    }

    /// Add the pipeline stages in the order requests pass through them
    pub fn configure(&self, app: &mut ApplicationBuilder, environment: &Environment) -> HttpResult<()> {
        if environment.is_development() {
            app.use_swagger()?;
            app.use_swagger_ui(|_| {})?;
        }

        app.use_static_files()?;
        app.use_cors(CORS_POLICY)?;
        app.use_routing()?;
        app.use_authentication()?;
        app.use_authorization()?;
        app.use_endpoints(|endpoints| {
            endpoints.map_controllers();
        })?;

        tracing::info!(
            environment = %environment,
            stages = ?app.stage_names(),
            "Request pipeline configured"
        );
        Ok(())
    }
}
