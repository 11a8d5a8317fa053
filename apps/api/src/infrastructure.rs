//! Infrastructure registrations: host settings and bearer token validation

use rym_auth::{AuthServiceCollectionExt, JwtSettings};
use rym_core::{Configuration, CoreResult, ServiceCollection};
use rym_http::HttpConfig;

/// Register the settings and external services read from `configuration`.
///
/// Fails when the `jwt` section is missing or invalid.
pub fn add_infrastructure(services: &mut ServiceCollection, configuration: &Configuration) -> CoreResult<()> {
    let http = HttpConfig::from_configuration(configuration)?;
    let jwt = JwtSettings::from_configuration(configuration)?;

    tracing::debug!(
        host = %http.host,
        port = http.port,
        web_root = %http.web_root.display(),
        "Infrastructure settings loaded"
    );

    services.add_singleton(http);
    services.add_jwt_bearer(jwt);
    Ok(())
}
