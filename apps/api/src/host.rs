//! Process-level wiring shared by the binary and the integration tests

use std::path::Path;
use std::sync::Arc;

use rym_core::config::ENV_PREFIX;
use rym_core::{ConfigError, Configuration, Environment, ServiceCollection};
use rym_http::{Application, ApplicationBuilder, HttpError, HttpResult};

use crate::startup::Startup;

/// Layer `appsettings.yaml`, `appsettings.{environment}.yaml` and the
/// `RYM__` environment variables, later layers winning
pub fn load_configuration(content_root: &Path, environment: &Environment) -> Result<Configuration, ConfigError> {
    let configuration = Configuration::builder()
        .add_yaml_file(content_root.join("appsettings.yaml"), true)?
        .add_yaml_file(content_root.join(format!("appsettings.{}.yaml", environment)), true)?
        .add_env_vars(ENV_PREFIX)
        .build();

    tracing::debug!(keys = configuration.len(), "Configuration loaded");
    Ok(configuration)
}

/// Register the services and assemble the pipeline for `environment`
pub fn build_application(configuration: Arc<Configuration>, environment: &Environment) -> HttpResult<Application> {
    let startup = Startup::new(configuration);

    let mut services = ServiceCollection::new();
    startup
        .configure_services(&mut services)
        .map_err(|e| HttpError::startup(format!("Service registration failed: {}", e)))?;

    let mut app = ApplicationBuilder::new(Arc::new(services.build()));
    startup.configure(&mut app, environment)?;
    app.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    #[serial]
    fn test_layers_override_in_order() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("appsettings.yaml"),
            "server:\n  port: 5000\njwt:\n  issuer: RyM\n",
        )
        .unwrap();
        fs::write(root.path().join("appsettings.development.yaml"), "server:\n  port: 5001\n").unwrap();
        std::env::set_var("RYM__JWT__ISSUER", "RyM-env");

        let configuration = load_configuration(root.path(), &Environment::Development).unwrap();
        std::env::remove_var("RYM__JWT__ISSUER");

        assert_eq!(configuration.get("server:port"), Some("5001"));
        assert_eq!(configuration.get("jwt:issuer"), Some("RyM-env"));
    }

    #[test]
    #[serial]
    fn test_missing_files_are_optional() {
        let root = tempfile::tempdir().unwrap();
        let configuration = load_configuration(root.path(), &Environment::Production).unwrap();
        assert!(configuration.get("server:port").is_none());
    }

    #[test]
    fn test_registration_failure_is_startup_error() {
        let result = build_application(Arc::new(Configuration::empty()), &Environment::Production);
        assert!(matches!(result, Err(HttpError::StartupFailed { .. })));
    }
}
