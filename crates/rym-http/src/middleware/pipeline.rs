//! # Middleware pipeline
//!
//! Chain of responsibility with a `handle(request, next)` contract. Every
//! stage either produces a response itself or hands the request on with
//! [`Next::run`]; work after `next.run(...)` sees the downstream response.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::RymRequest;
use crate::response::RymResponse;

/// Boxed future returned by middleware and by the rest of the chain
pub type NextFuture<'a> = Pin<Box<dyn Future<Output = RymResponse> + Send + 'a>>;

/// The remainder of the middleware chain
pub struct Next {
    handler: Box<dyn FnOnce(RymRequest) -> NextFuture<'static> + Send>,
}

impl Next {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(RymRequest) -> NextFuture<'static> + Send + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Run the rest of the chain with the given request
    pub async fn run(self, request: RymRequest) -> RymResponse {
        (self.handler)(request).await
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// A pipeline stage.
///
/// The returned future must be `'static`: clone whatever state the stage
/// needs out of `self` before boxing the future.
pub trait Middleware: Send + Sync + std::fmt::Debug {
    fn handle(&self, request: RymRequest, next: Next) -> NextFuture<'static>;

    /// Stage name, used in logs and diagnostics
    fn name(&self) -> &'static str {
        "Middleware"
    }
}

/// Ordered, immutable-once-built list of stages
#[derive(Debug, Clone, Default)]
pub struct MiddlewarePipeline {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewarePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in insertion order
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn add_arc(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Run the request through every stage, then `terminal` if the last
    /// stage calls `next`
    pub async fn execute<F, Fut>(&self, request: RymRequest, terminal: F) -> RymResponse
    where
        F: FnOnce(RymRequest) -> Fut + Send + 'static,
        Fut: Future<Output = RymResponse> + Send + 'static,
    {
        let mut chain = Box::new(move |req: RymRequest| Box::pin(terminal(req)) as NextFuture<'static>)
            as Box<dyn FnOnce(RymRequest) -> NextFuture<'static> + Send>;

        for middleware in self.middleware.iter().rev() {
            let middleware = middleware.clone();
            let next_handler = chain;
            chain = Box::new(move |req: RymRequest| {
                let next = Next::new(next_handler);
                middleware.handle(req, next)
            });
        }

        chain(request).await
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Stage names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }
}

impl From<Vec<Arc<dyn Middleware>>> for MiddlewarePipeline {
    fn from(middleware: Vec<Arc<dyn Middleware>>) -> Self {
        Self { middleware }
    }
}
