use std::sync::Arc;

use anyhow::Context;
use rym_api::{host, SERVICE_NAME, SERVICE_VERSION};
use rym_core::Environment;
use rym_http::{init_logging, log_shutdown_info, log_startup_info, HttpConfig, LoggingConfig, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env()?;
    init_logging(LoggingConfig::for_environment(&environment).with_service(SERVICE_NAME, SERVICE_VERSION))
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialise logging")?;
    log_startup_info(SERVICE_NAME, SERVICE_VERSION, &environment);

    let content_root = std::env::current_dir().context("Failed to read the working directory")?;
    let configuration = host::load_configuration(&content_root, &environment)?;
    let application = host::build_application(Arc::new(configuration), &environment)?;
    let http = application.services().resolve_cloned::<HttpConfig>()?;

    Server::new(application, http).listen().await?;

    log_shutdown_info(SERVICE_NAME);
    Ok(())
}
