//! # rym-api
//!
//! Host of the RyM Lubricentro API. [`Startup`] registers the services and
//! assembles the request pipeline; the business layers plug in through
//! [`infrastructure::add_infrastructure`] and [`application::add_application`].

pub mod application;
pub mod controllers;
pub mod host;
pub mod infrastructure;
pub mod startup;

pub use startup::{Startup, API_DOCUMENT, CORS_POLICY};

pub const SERVICE_NAME: &str = "rym-api";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
