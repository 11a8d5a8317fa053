use std::net::SocketAddr;
use std::path::PathBuf;

use rym_core::{ConfigError, Configuration};

/// Settings for the HTTP host, read from the `server` section
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Directory served by the static files stage
    pub web_root: PathBuf,
    pub max_request_size: usize,
    pub shutdown_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            web_root: PathBuf::from("wwwroot"),
            max_request_size: 2 * 1024 * 1024,
            shutdown_timeout_secs: 30,
        }
    }
}

impl HttpConfig {
    pub const SECTION: &'static str = "server";

    /// Overlay the `server` section on the defaults
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigError> {
        let section = configuration.section(Self::SECTION);
        let defaults = Self::default();

        let port: u16 = section.get_parsed("port")?.unwrap_or(defaults.port);
        if port == 0 {
            return Err(ConfigError::invalid_value("server:port", "0", "a port between 1 and 65535"));
        }

        let max_request_size: usize = section
            .get_parsed("max_request_size")?
            .unwrap_or(defaults.max_request_size);
        if max_request_size == 0 {
            return Err(ConfigError::invalid_value(
                "server:max_request_size",
                "0",
                "a positive number of bytes",
            ));
        }

        Ok(Self {
            host: section.get_or("host", &defaults.host),
            port,
            web_root: section
                .get("web_root")
                .map(PathBuf::from)
                .unwrap_or(defaults.web_root),
            max_request_size,
            shutdown_timeout_secs: section
                .get_parsed("shutdown_timeout_secs")?
                .unwrap_or(defaults.shutdown_timeout_secs),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| ConfigError::invalid_value("server:host", raw, "an IP address"))
    }
}
