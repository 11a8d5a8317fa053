//! Registration phase of the container.
//!
//! A [`ServiceCollection`] records registrations in order. Registering the
//! same service type twice is allowed: the later registration replaces the
//! earlier one when the collection is built.

use std::collections::HashMap;

use crate::container::descriptor::{ServiceDescriptor, ServiceId};
use crate::container::scope::ServiceLifetime;
use crate::container::Container;
use crate::errors::CoreResult;

#[derive(Debug, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-built singleton
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, instance: T) -> &mut Self {
        self.add(ServiceDescriptor::instance(instance))
    }

    /// Register a singleton built lazily on first resolution
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> CoreResult<T> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::factory(ServiceLifetime::Singleton, factory))
    }

    /// Register a service built anew on every resolution
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> CoreResult<T> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::factory(ServiceLifetime::Transient, factory))
    }

    /// Register a singleton only when the type has no registration yet.
    /// Returns whether the instance was registered.
    pub fn try_add_singleton<T: Send + Sync + 'static>(&mut self, instance: T) -> bool {
        if self.contains::<T>() {
            return false;
        }
        self.add_singleton(instance);
        true
    }

    /// Append a raw descriptor
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        tracing::trace!(
            service = descriptor.service_id.type_name(),
            lifetime = %descriptor.lifetime,
            "Registering service"
        );
        self.descriptors.push(descriptor);
        self
    }

    /// Check whether a type has at least one registration
    pub fn contains<T: 'static>(&self) -> bool {
        let id = ServiceId::of::<T>();
        self.descriptors.iter().any(|d| d.service_id == id)
    }

    /// Registered type names in registration order
    pub fn registrations(&self) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .map(|d| d.service_id.type_name())
            .collect()
    }

    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the registrations into a resolvable container
    pub fn build(self) -> Container {
        let total = self.descriptors.len();
        let mut resolved: HashMap<ServiceId, ServiceDescriptor> = HashMap::with_capacity(total);

        for descriptor in self.descriptors {
            if let Some(previous) = resolved.insert(descriptor.service_id, descriptor) {
                tracing::debug!(
                    service = previous.service_id.type_name(),
                    "Later registration replaces an earlier one"
                );
            }
        }

        tracing::debug!(
            registrations = total,
            services = resolved.len(),
            "Service container built"
        );
        Container::from_descriptors(resolved)
    }
}
