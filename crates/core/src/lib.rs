//! # rym-core
//!
//! Foundation shared by every RyM Lubricentro crate:
//! - layered, read-only [`Configuration`] with source tracking
//! - hosting [`Environment`] detection
//! - a [`ServiceCollection`] / [`Container`] pair for dependency injection

pub mod config;
pub mod container;
pub mod errors;

pub use config::{ConfigError, ConfigSource, Configuration, ConfigurationBuilder, Environment};
pub use container::{Container, ServiceCollection, ServiceDescriptor, ServiceId, ServiceLifetime};
pub use errors::{CoreError, CoreResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
