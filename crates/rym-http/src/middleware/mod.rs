//! Middleware contract and built-in stages

pub mod pipeline;
pub mod static_files;

pub use pipeline::{Middleware, MiddlewarePipeline, Next, NextFuture};
pub use static_files::StaticFilesMiddleware;
