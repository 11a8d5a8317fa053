//! Registration of the API explorer, document generation and the
//! documentation stages

use std::sync::Arc;

use rym_core::{CoreError, ServiceCollection};
use rym_http::{ApplicationBuilder, ControllerRegistry, HttpError, HttpResult, Middleware, StageKind};

use crate::config::{SwaggerGenOptions, SwaggerOptions, SwaggerUiOptions};
use crate::error::OpenApiResult;
use crate::explorer::ApiExplorer;
use crate::generator::SwaggerGenerator;
use crate::middleware::{SwaggerMiddleware, SwaggerUiMiddleware};

pub trait OpenApiServiceCollectionExt {
    /// Register the [`ApiExplorer`], built from the registered controllers
    /// on first use
    fn add_endpoints_api_explorer(&mut self) -> &mut Self;

    /// Register the documents to generate and the [`SwaggerGenerator`]
    fn add_swagger_gen<F>(&mut self, configure: F) -> OpenApiResult<&mut Self>
    where
        F: FnOnce(&mut SwaggerGenOptions) -> OpenApiResult<()>;
}

impl OpenApiServiceCollectionExt for ServiceCollection {
    fn add_endpoints_api_explorer(&mut self) -> &mut Self {
        self.add_singleton_factory(|container| {
            let explorer = match container.try_resolve::<ControllerRegistry>()? {
                Some(registry) => ApiExplorer::from_controllers(&registry)?,
                None => ApiExplorer::default(),
            };
            Ok(explorer)
        })
    }

    fn add_swagger_gen<F>(&mut self, configure: F) -> OpenApiResult<&mut Self>
    where
        F: FnOnce(&mut SwaggerGenOptions) -> OpenApiResult<()>,
    {
        let mut options = SwaggerGenOptions::new();
        configure(&mut options)?;
        tracing::debug!(
            documents = ?options.document_names().collect::<Vec<_>>(),
            "Swagger generation registered"
        );

        self.add_singleton(options);
        self.add_singleton_factory(|container| {
            let options = container.resolve::<SwaggerGenOptions>()?;
            let explorer = container.try_resolve::<ApiExplorer>()?.ok_or_else(|| {
                CoreError::registration("openapi", "add_swagger_gen needs add_endpoints_api_explorer")
            })?;
            Ok(SwaggerGenerator::new(options, explorer))
        });
        Ok(self)
    }
}

pub trait OpenApiApplicationBuilderExt {
    /// Serve every generated document at the default route template
    fn use_swagger(&mut self) -> HttpResult<&mut Self> {
        self.use_swagger_with(SwaggerOptions::default())
    }

    fn use_swagger_with(&mut self, options: SwaggerOptions) -> HttpResult<&mut Self>;

    /// Serve the Swagger UI page
    fn use_swagger_ui<F>(&mut self, configure: F) -> HttpResult<&mut Self>
    where
        F: FnOnce(&mut SwaggerUiOptions);
}

impl OpenApiApplicationBuilderExt for ApplicationBuilder {
    fn use_swagger_with(&mut self, options: SwaggerOptions) -> HttpResult<&mut Self> {
        options.validate()?;
        if !self.services().contains::<SwaggerGenerator>() {
            return Err(HttpError::pipeline("use_swagger needs add_swagger_gen"));
        }

        self.use_stage(StageKind::Documentation, "Swagger", move |context| {
            let generator = context.services().resolve::<SwaggerGenerator>()?;
            let specs = generator
                .options()
                .document_names()
                .map(|name| Ok((name.to_string(), generator.generate(name)?)))
                .collect::<OpenApiResult<Vec<_>>>()?;

            let middleware = SwaggerMiddleware::new(&options, &specs)?;
            tracing::info!(paths = ?middleware.paths(), "OpenAPI documents available");
            Ok(Arc::new(middleware) as Arc<dyn Middleware>)
        })
    }

    fn use_swagger_ui<F>(&mut self, configure: F) -> HttpResult<&mut Self>
    where
        F: FnOnce(&mut SwaggerUiOptions),
    {
        let mut options = SwaggerUiOptions::default();
        configure(&mut options);

        let endpoints = if options.endpoints.is_empty() {
            let generation = self.services().resolve::<SwaggerGenOptions>().map_err(|_| {
                HttpError::pipeline("use_swagger_ui needs add_swagger_gen or explicit swagger endpoints")
            })?;
            let paths = SwaggerOptions::default();
            generation
                .document_names()
                .map(|name| {
                    let label = generation
                        .document(name)
                        .map(|info| format!("{} {}", info.title, info.version))
                        .unwrap_or_else(|_| name.to_string());
                    (paths.json_path(name), label)
                })
                .collect()
        } else {
            options.endpoints.clone()
        };

        let middleware = SwaggerUiMiddleware::new(&options, &endpoints);
        self.use_stage(StageKind::Documentation, "SwaggerUI", move |_| {
            Ok(Arc::new(middleware) as Arc<dyn Middleware>)
        })
    }
}
