pub mod app_config;
pub mod configuration;
pub mod validation;

pub use app_config::{Environment, ENVIRONMENT_VARIABLE};
pub use configuration::{ConfigSource, Configuration, ConfigurationBuilder, ENV_DELIMITER, ENV_PREFIX, KEY_DELIMITER};
pub use validation::ConfigError;
