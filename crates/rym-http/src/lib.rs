//! # rym-http
//!
//! HTTP layer of the RyM Lubricentro API: request and response types, the
//! `handle(request, next)` middleware pipeline, controllers and routing,
//! JSON conventions, the application builder and the server host.

pub mod builder;
pub mod config;
pub mod context;
pub mod controller;
pub mod endpoints;
pub mod errors;
pub mod identity;
pub mod json;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routing;
pub mod server;
pub mod services;

pub use builder::{Application, ApplicationBuilder, EndpointRouteBuilder, PipelineContext, StageKind};
pub use config::HttpConfig;
pub use context::{HttpContext, HttpContextAccessor, TraceIdentifier};
pub use controller::{Controller, ControllerRegistry, Handler, HandlerFuture, RouteDefinition};
pub use endpoints::EndpointMiddleware;
pub use errors::{HttpError, HttpResult};
pub use identity::Principal;
pub use json::{DateOnly, EscapePolicy, JsonOptions};
pub use logging::{init_logging, log_shutdown_info, log_startup_info, LoggingConfig};
pub use middleware::{Middleware, MiddlewarePipeline, Next, NextFuture, StaticFilesMiddleware};
pub use request::RymRequest;
pub use response::RymResponse;
pub use routing::{AuthorizationRequirement, EndpointMetadata, RouteMatch, RouteTable};
pub use server::Server;
pub use services::{ControllersBuilder, HttpServiceCollectionExt};

/// Re-exported so dependent crates name the same `http` types
pub use axum::http;
