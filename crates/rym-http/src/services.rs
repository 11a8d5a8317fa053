//! Service registration helpers for the HTTP layer

use rym_core::ServiceCollection;

use crate::context::HttpContextAccessor;
use crate::controller::ControllerRegistry;
use crate::json::JsonOptions;

pub trait HttpServiceCollectionExt {
    /// Register the application's controllers. JSON options default to
    /// [`JsonOptions::default`] until configured on the returned builder.
    fn add_controllers(&mut self, controllers: ControllerRegistry) -> ControllersBuilder<'_>;

    fn add_http_context_accessor(&mut self) -> &mut Self;
}

impl HttpServiceCollectionExt for ServiceCollection {
    fn add_controllers(&mut self, controllers: ControllerRegistry) -> ControllersBuilder<'_> {
        tracing::debug!(controllers = ?controllers.names(), "Registering controllers");
        self.add_singleton(controllers);
        self.try_add_singleton(JsonOptions::default());
        ControllersBuilder {
            services: self,
            json: JsonOptions::default(),
        }
    }

    fn add_http_context_accessor(&mut self) -> &mut Self {
        self.try_add_singleton(HttpContextAccessor::new());
        self
    }
}

/// Follow-up configuration of a controller registration
pub struct ControllersBuilder<'a> {
    services: &'a mut ServiceCollection,
    json: JsonOptions,
}

impl<'a> ControllersBuilder<'a> {
    /// Adjust the JSON options used for controller bodies. Repeated calls
    /// build on the previous adjustments.
    pub fn add_json_options<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut JsonOptions),
    {
        configure(&mut self.json);
        self.services.add_singleton(self.json);
        self
    }

    pub fn services(self) -> &'a mut ServiceCollection {
        self.services
    }
}
