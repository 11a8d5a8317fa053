//! # rym-openapi
//!
//! OpenAPI 3 documents for the RyM Lubricentro API, generated from the
//! registered controllers, plus the pipeline stages serving them and the
//! Swagger UI page.
//!
//! ```rust,ignore
//! services.add_endpoints_api_explorer();
//! services.add_swagger_gen(|options| {
//!     options.swagger_doc("v1", ApiInfo::new("RyM Lubricentro API", "v1"))?;
//!     Ok(())
//! })?;
//!
//! if environment.is_development() {
//!     app.use_swagger()?;
//!     app.use_swagger_ui(|_| {})?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod explorer;
pub mod generator;
pub mod integration;
pub mod middleware;
pub mod specification;

pub use config::{SwaggerGenOptions, SwaggerOptions, SwaggerUiOptions};
pub use error::{OpenApiError, OpenApiResult};
pub use explorer::{ApiDescription, ApiExplorer, ApiParameter};
pub use generator::SwaggerGenerator;
pub use integration::{OpenApiApplicationBuilderExt, OpenApiServiceCollectionExt};
pub use middleware::{SwaggerMiddleware, SwaggerUiMiddleware};
pub use specification::{
    ApiInfo, Contact, License, OpenApiSpec, Operation, SecurityRequirement, SecurityScheme, OPENAPI_VERSION,
};
