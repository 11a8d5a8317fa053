//! # Application builder
//!
//! Records pipeline stages in call order and turns them into an
//! [`Application`]. Ordering rules are checked as each stage is added, so a
//! misordered pipeline fails at startup instead of misbehaving per request.
//! Stage construction is deferred to [`ApplicationBuilder::build`] because
//! the routing stage needs the routes mapped later by `use_endpoints`.

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use rym_core::Container;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::HttpConfig;
use crate::context::TraceIdentifier;
use crate::controller::ControllerRegistry;
use crate::endpoints::EndpointMiddleware;
use crate::errors::{HttpError, HttpResult};
use crate::json::JsonOptions;
use crate::middleware::{Middleware, MiddlewarePipeline, StaticFilesMiddleware};
use crate::request::RymRequest;
use crate::response::RymResponse;
use crate::routing::{RouteTable, RoutingMiddleware};

/// Kinds of pipeline stages with ordering rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Custom,
    Documentation,
    StaticFiles,
    Cors,
    Routing,
    Authentication,
    Authorization,
    Endpoints,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Custom => "custom",
            StageKind::Documentation => "documentation",
            StageKind::StaticFiles => "static files",
            StageKind::Cors => "cors",
            StageKind::Routing => "routing",
            StageKind::Authentication => "authentication",
            StageKind::Authorization => "authorization",
            StageKind::Endpoints => "endpoints",
        }
    }

    /// Stages that must already be in the pipeline
    fn prerequisites(&self) -> &'static [StageKind] {
        match self {
            StageKind::Authorization | StageKind::Endpoints => &[StageKind::Routing],
            _ => &[],
        }
    }

    /// Stages that may appear at most once
    fn is_singular(&self) -> bool {
        matches!(
            self,
            StageKind::Cors
                | StageKind::Routing
                | StageKind::Authentication
                | StageKind::Authorization
                | StageKind::Endpoints
        )
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What stage factories can see when the pipeline is built
#[derive(Debug, Clone)]
pub struct PipelineContext {
    services: Arc<Container>,
    routes: Arc<RouteTable>,
    json: JsonOptions,
    http: HttpConfig,
}

impl PipelineContext {
    pub fn services(&self) -> &Arc<Container> {
        &self.services
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    pub fn json_options(&self) -> JsonOptions {
        self.json
    }

    pub fn http_config(&self) -> &HttpConfig {
        &self.http
    }
}

type StageFactory = Box<dyn FnOnce(&PipelineContext) -> HttpResult<Arc<dyn Middleware>> + Send>;

struct PendingStage {
    kind: StageKind,
    name: &'static str,
    factory: StageFactory,
}

/// Endpoint sources mapped by `use_endpoints`
#[derive(Debug, Default)]
pub struct EndpointRouteBuilder {
    controllers: bool,
}

impl EndpointRouteBuilder {
    /// Map every route of the registered controllers
    pub fn map_controllers(&mut self) -> &mut Self {
        self.controllers = true;
        self
    }
}

pub struct ApplicationBuilder {
    services: Arc<Container>,
    stages: Vec<PendingStage>,
    endpoints: Option<EndpointRouteBuilder>,
}

impl ApplicationBuilder {
    pub fn new(services: Arc<Container>) -> Self {
        Self {
            services,
            stages: Vec::new(),
            endpoints: None,
        }
    }

    pub fn services(&self) -> &Arc<Container> {
        &self.services
    }

    /// Append a stage built at [`Self::build`] time
    pub fn use_stage<F>(&mut self, kind: StageKind, name: &'static str, factory: F) -> HttpResult<&mut Self>
    where
        F: FnOnce(&PipelineContext) -> HttpResult<Arc<dyn Middleware>> + Send + 'static,
    {
        if kind.is_singular() && self.has_stage(kind) {
            return Err(HttpError::pipeline(format!(
                "The {} stage was added more than once",
                kind
            )));
        }
        if let Some(missing) = kind.prerequisites().iter().find(|p| !self.has_stage(**p)) {
            return Err(HttpError::pipeline(format!(
                "The {} stage must come after the {} stage",
                kind, missing
            )));
        }

        tracing::debug!(stage = name, kind = %kind, "Pipeline stage added");
        self.stages.push(PendingStage {
            kind,
            name,
            factory: Box::new(factory),
        });
        Ok(self)
    }

    /// Append an already-built custom stage
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        let name = middleware.name();
        let middleware: Arc<dyn Middleware> = Arc::new(middleware);
        self.stages.push(PendingStage {
            kind: StageKind::Custom,
            name,
            factory: Box::new(move |_| Ok(middleware)),
        });
        self
    }

    /// Serve files from the configured web root
    pub fn use_static_files(&mut self) -> HttpResult<&mut Self> {
        self.use_stage(StageKind::StaticFiles, "StaticFiles", |context| {
            Ok(Arc::new(StaticFilesMiddleware::new(&context.http_config().web_root)) as Arc<dyn Middleware>)
        })
    }

    pub fn use_routing(&mut self) -> HttpResult<&mut Self> {
        self.use_stage(StageKind::Routing, "Routing", |context| {
            Ok(Arc::new(RoutingMiddleware::new(context.routes().clone())) as Arc<dyn Middleware>)
        })
    }

    pub fn use_endpoints<F>(&mut self, configure: F) -> HttpResult<&mut Self>
    where
        F: FnOnce(&mut EndpointRouteBuilder),
    {
        let mut endpoints = EndpointRouteBuilder::default();
        configure(&mut endpoints);

        self.use_stage(StageKind::Endpoints, "Endpoints", |context| {
            Ok(Arc::new(EndpointMiddleware::new(
                context.services().clone(),
                context.json_options(),
            )) as Arc<dyn Middleware>)
        })?;
        self.endpoints = Some(endpoints);
        Ok(self)
    }

    pub fn has_stage(&self, kind: StageKind) -> bool {
        self.stages.iter().any(|stage| stage.kind == kind)
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name).collect()
    }

    pub fn build(self) -> HttpResult<Application> {
        let http = self
            .services
            .try_resolve::<HttpConfig>()?
            .map(|config| (*config).clone())
            .unwrap_or_default();
        let json = self
            .services
            .try_resolve::<JsonOptions>()?
            .map(|options| *options)
            .unwrap_or_default();

        let routes = match &self.endpoints {
            Some(endpoints) if endpoints.controllers => {
                let registry = self.services.try_resolve::<ControllerRegistry>()?.ok_or_else(|| {
                    HttpError::pipeline("map_controllers needs controllers registered with add_controllers")
                })?;
                RouteTable::from_controllers(&registry)?
            }
            _ => RouteTable::new(),
        };

        let context = PipelineContext {
            services: self.services.clone(),
            routes: Arc::new(routes),
            json,
            http,
        };

        let mut pipeline = MiddlewarePipeline::new();
        for stage in self.stages {
            let middleware = (stage.factory)(&context)?;
            pipeline.add_arc(middleware);
        }

        tracing::info!(
            stages = ?pipeline.names(),
            endpoints = context.routes.len(),
            "Request pipeline built"
        );

        Ok(Application {
            services: context.services,
            pipeline,
            routes: context.routes,
            max_request_size: context.http.max_request_size,
        })
    }
}

impl fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("stages", &self.stage_names())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// The assembled request pipeline
#[derive(Debug, Clone)]
pub struct Application {
    services: Arc<Container>,
    pipeline: MiddlewarePipeline,
    routes: Arc<RouteTable>,
    max_request_size: usize,
}

impl Application {
    /// Run one request through the pipeline. Requests no stage answers get
    /// a 404.
    pub async fn handle(&self, mut request: RymRequest) -> RymResponse {
        if request.extension::<TraceIdentifier>().is_none() {
            request.insert_extension(TraceIdentifier::generate());
        }
        let span = tracing::info_span!(
            "request",
            trace_id = %request.extension::<TraceIdentifier>().map(|id| id.0.as_str()).unwrap_or_default(),
            method = %request.method,
            path = %request.path(),
        );

        self.pipeline
            .execute(request, |_| async { RymResponse::not_found() })
            .instrument(span)
            .await
    }

    async fn dispatch(&self, request: Request<Body>) -> Response<Body> {
        match RymRequest::from_axum(request, self.max_request_size).await {
            Ok(request) => self.handle(request).await.into_axum_response(),
            Err(error) => error.into_response().into_axum_response(),
        }
    }

    /// Axum router sending every request through the pipeline
    pub fn into_router(self) -> axum::Router {
        let application = Arc::new(self);
        axum::Router::new()
            .fallback(move |request: Request<Body>| {
                let application = application.clone();
                async move { application.dispatch(request).await }
            })
            .layer(TraceLayer::new_for_http())
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.names()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn services(&self) -> &Arc<Container> {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, RouteDefinition};
    use crate::middleware::{Next, NextFuture};
    use crate::services::HttpServiceCollectionExt;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use rym_core::ServiceCollection;
    use tower::ServiceExt;

    struct Ping;

    impl Controller for Ping {
        fn name(&self) -> &'static str {
            "Ping"
        }

        fn base_path(&self) -> &str {
            "/ping"
        }

        fn routes(self: Arc<Self>) -> Vec<RouteDefinition> {
            vec![RouteDefinition::get("", |context, _| async move {
                context.ok(&serde_json::json!({ "pong": true }))
            })]
        }
    }

    #[derive(Debug)]
    struct Stamp;

    impl Middleware for Stamp {
        fn handle(&self, request: RymRequest, next: Next) -> NextFuture<'static> {
            Box::pin(async move { next.run(request).await.with_header("x-stamp", "1") })
        }

        fn name(&self) -> &'static str {
            "Stamp"
        }
    }

    fn services() -> Arc<Container> {
        let mut services = ServiceCollection::new();
        services.add_controllers(ControllerRegistry::new().with(Ping));
        Arc::new(services.build())
    }

    fn application() -> Application {
        let mut app = ApplicationBuilder::new(services());
        app.use_middleware(Stamp);
        app.use_routing().unwrap();
        app.use_endpoints(|endpoints| {
            endpoints.map_controllers();
        })
        .unwrap();
        app.build().unwrap()
    }

    fn get(path: &'static str) -> RymRequest {
        RymRequest::new(Method::GET, Uri::from_static(path), HeaderMap::new())
    }

    #[tokio::test]
    async fn test_pipeline_serves_controller() {
        let application = application();
        assert_eq!(application.stage_names(), vec!["Stamp", "Routing", "Endpoints"]);

        let response = application.handle(get("/ping")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header_str("x-stamp"), Some("1"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = application().handle(get("/missing")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.header_str("x-stamp"), Some("1"));
    }

    #[tokio::test]
    async fn test_axum_router() {
        let router = application().into_router();
        let response = router
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_endpoints_require_routing() {
        let mut app = ApplicationBuilder::new(services());
        let err = app.use_endpoints(|e| {
            e.map_controllers();
        });
        assert!(matches!(err, Err(HttpError::InvalidPipeline { .. })));
    }

    #[test]
    fn test_routing_added_once() {
        let mut app = ApplicationBuilder::new(services());
        app.use_routing().unwrap();
        let err = app.use_routing().err().unwrap();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_map_controllers_needs_registration() {
        let mut app = ApplicationBuilder::new(Arc::new(ServiceCollection::new().build()));
        app.use_routing().unwrap();
        app.use_endpoints(|e| {
            e.map_controllers();
        })
        .unwrap();
        assert!(matches!(app.build(), Err(HttpError::InvalidPipeline { .. })));
    }
}
