use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::container::scope::ServiceLifetime;
use crate::container::Container;
use crate::errors::CoreResult;

/// Service identifier: the registered Rust type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ServiceId {
    /// Create a new service ID for a type
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Type-erased shared service instance
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

/// Factory creating a service instance from the built container
pub type ServiceFactory = Arc<dyn Fn(&Container) -> CoreResult<ServiceInstance> + Send + Sync>;

/// Strategy for activating/creating service instances
#[derive(Clone)]
pub enum ServiceActivation {
    /// Pre-created instance
    Instance(ServiceInstance),
    /// Instance produced by a factory on resolution
    Factory(ServiceFactory),
}

impl std::fmt::Debug for ServiceActivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceActivation::Instance(_) => write!(f, "Instance(<value>)"),
            ServiceActivation::Factory(_) => write!(f, "Factory(<factory_fn>)"),
        }
    }
}

/// Service descriptor containing all metadata for a registration
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub service_id: ServiceId,
    pub lifetime: ServiceLifetime,
    pub activation: ServiceActivation,
}

impl ServiceDescriptor {
    /// Describe a pre-built singleton instance
    pub fn instance<T: Send + Sync + 'static>(instance: T) -> Self {
        Self {
            service_id: ServiceId::of::<T>(),
            lifetime: ServiceLifetime::Singleton,
            activation: ServiceActivation::Instance(Arc::new(instance)),
        }
    }

    /// Describe a factory-created service with the given lifetime
    pub fn factory<T, F>(lifetime: ServiceLifetime, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> CoreResult<T> + Send + Sync + 'static,
    {
        let factory: ServiceFactory =
            Arc::new(move |container| factory(container).map(|value| Arc::new(value) as ServiceInstance));
        Self {
            service_id: ServiceId::of::<T>(),
            lifetime,
            activation: ServiceActivation::Factory(factory),
        }
    }
}
