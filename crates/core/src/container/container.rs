use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::container::descriptor::{ServiceActivation, ServiceDescriptor, ServiceId, ServiceInstance};
use crate::errors::{CoreError, CoreResult};

thread_local! {
    /// Services currently being constructed on this thread, outermost first
    static RESOLUTION_STACK: RefCell<Vec<ServiceId>> = const { RefCell::new(Vec::new()) };
}

/// Built, read-only service container
#[derive(Debug)]
pub struct Container {
    descriptors: HashMap<ServiceId, ServiceDescriptor>,
    singletons: RwLock<HashMap<ServiceId, ServiceInstance>>,
}

impl Container {
    pub(crate) fn from_descriptors(descriptors: HashMap<ServiceId, ServiceDescriptor>) -> Self {
        Self {
            descriptors,
            singletons: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a service by type
    pub fn resolve<T: Send + Sync + 'static>(&self) -> CoreResult<Arc<T>> {
        let service_id = ServiceId::of::<T>();
        let instance = self.resolve_instance(&service_id)?;
        instance
            .downcast::<T>()
            .map_err(|_| CoreError::ServiceTypeMismatch {
                service_type: service_id.type_name().to_string(),
            })
    }

    /// Resolve a service, `Ok(None)` when it was never registered
    pub fn try_resolve<T: Send + Sync + 'static>(&self) -> CoreResult<Option<Arc<T>>> {
        if !self.contains::<T>() {
            return Ok(None);
        }
        self.resolve::<T>().map(Some)
    }

    /// Resolve a service and clone it out of the container.
    ///
    /// Convenient for services registered as `Arc<dyn Trait>`.
    pub fn resolve_cloned<T: Clone + Send + Sync + 'static>(&self) -> CoreResult<T> {
        self.resolve::<T>().map(|service| (*service).clone())
    }

    /// Check whether a type is registered
    pub fn contains<T: 'static>(&self) -> bool {
        self.descriptors.contains_key(&ServiceId::of::<T>())
    }

    /// Number of distinct registered services
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Registered service type names, sorted
    pub fn service_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.descriptors.keys().map(|id| id.type_name()).collect();
        names.sort_unstable();
        names
    }

    fn resolve_instance(&self, service_id: &ServiceId) -> CoreResult<ServiceInstance> {
        let descriptor = self
            .descriptors
            .get(service_id)
            .ok_or_else(|| CoreError::service_not_found(service_id.type_name()))?;

        let factory = match &descriptor.activation {
            ServiceActivation::Instance(instance) => return Ok(instance.clone()),
            ServiceActivation::Factory(factory) => factory,
        };

        if descriptor.lifetime.is_singleton() {
            let singletons = self.singletons.read().map_err(|_| CoreError::LockError {
                resource: "singletons".to_string(),
            })?;
            if let Some(instance) = singletons.get(service_id) {
                return Ok(instance.clone());
            }
        }

        let instance = self.with_cycle_guard(service_id, || factory(self))?;

        if descriptor.lifetime.is_singleton() {
            let mut singletons = self.singletons.write().map_err(|_| CoreError::LockError {
                resource: "singletons".to_string(),
            })?;
            // A concurrent resolution may have won the race; keep the first instance.
            let stored = singletons
                .entry(*service_id)
                .or_insert_with(|| instance.clone());
            return Ok(stored.clone());
        }

        Ok(instance)
    }

    fn with_cycle_guard<F>(&self, service_id: &ServiceId, create: F) -> CoreResult<ServiceInstance>
    where
        F: FnOnce() -> CoreResult<ServiceInstance>,
    {
        let cycle = RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(service_id) {
                let path = stack
                    .iter()
                    .chain(std::iter::once(service_id))
                    .map(|id| id.type_name())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                Some(path)
            } else {
                stack.push(*service_id);
                None
            }
        });

        if let Some(path) = cycle {
            return Err(CoreError::CircularDependency { path });
        }

        let _frame = ResolutionFrame;
        create()
    }
}

/// Pops the innermost [`RESOLUTION_STACK`] entry when dropped, including
/// while a panicking factory unwinds
struct ResolutionFrame;

impl Drop for ResolutionFrame {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::container::ServiceCollection;
    use crate::errors::CoreError;
    use std::panic::AssertUnwindSafe;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Greeting(String);

    #[derive(Debug)]
    struct Counter(usize);

    trait Clock: Send + Sync {
        fn year(&self) -> i32;
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn year(&self) -> i32 {
            2024
        }
    }

    #[test]
    fn test_resolve_instance() {
        let mut services = ServiceCollection::new();
        services.add_singleton(Greeting("hola".to_string()));
        let container = services.build();

        let greeting = container.resolve::<Greeting>().unwrap();
        assert_eq!(greeting.0, "hola");
        assert!(container.contains::<Greeting>());
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_missing_service() {
        let container = ServiceCollection::new().build();
        let err = container.resolve::<Greeting>().unwrap_err();
        assert!(err.is_service_not_found());
        assert!(container.try_resolve::<Greeting>().unwrap().is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut services = ServiceCollection::new();
        services
            .add_singleton(Greeting("first".to_string()))
            .add_singleton(Greeting("second".to_string()));
        assert_eq!(services.len(), 2);

        let container = services.build();
        assert_eq!(container.resolve_cloned::<Greeting>().unwrap().0, "second");
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_try_add_singleton_keeps_existing() {
        let mut services = ServiceCollection::new();
        assert!(services.try_add_singleton(Greeting("kept".to_string())));
        assert!(!services.try_add_singleton(Greeting("dropped".to_string())));

        let container = services.build();
        assert_eq!(container.resolve_cloned::<Greeting>().unwrap().0, "kept");
    }

    #[test]
    fn test_singleton_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory_calls = calls.clone();

        let mut services = ServiceCollection::new();
        services.add_singleton_factory(move |_| {
            let n = factory_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Counter(n))
        });
        let container = services.build();

        let a = container.resolve::<Counter>().unwrap();
        let b = container.resolve::<Counter>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_factory_runs_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory_calls = calls.clone();

        let mut services = ServiceCollection::new();
        services.add_transient_factory(move |_| Ok(Counter(factory_calls.fetch_add(1, Ordering::SeqCst))));
        let container = services.build();

        assert_eq!(container.resolve::<Counter>().unwrap().0, 0);
        assert_eq!(container.resolve::<Counter>().unwrap().0, 1);
    }

    #[test]
    fn test_factory_resolves_dependencies() {
        let mut services = ServiceCollection::new();
        services.add_singleton(Greeting("buen día".to_string()));
        services.add_singleton_factory(|c| {
            let greeting = c.resolve::<Greeting>()?;
            Ok(Counter(greeting.0.chars().count()))
        });
        let container = services.build();

        assert_eq!(container.resolve::<Counter>().unwrap().0, 8);
    }

    #[test]
    fn test_trait_object_registration() {
        let mut services = ServiceCollection::new();
        services.add_singleton::<Arc<dyn Clock>>(Arc::new(FixedClock));
        let container = services.build();

        let clock = container.resolve_cloned::<Arc<dyn Clock>>().unwrap();
        assert_eq!(clock.year(), 2024);
    }

    #[test]
    fn test_circular_dependency_is_detected() {
        let mut services = ServiceCollection::new();
        services.add_singleton_factory(|c| {
            let _ = c.resolve::<Counter>()?;
            Ok(Greeting("never".to_string()))
        });
        services.add_singleton_factory(|c| {
            let _ = c.resolve::<Greeting>()?;
            Ok(Counter(0))
        });
        let container = services.build();

        let err = container.resolve::<Greeting>().unwrap_err();
        assert!(matches!(err, CoreError::CircularDependency { .. }));

        // The guard unwinds cleanly, so an unrelated resolution still works.
        let err = container.resolve::<Counter>().unwrap_err();
        assert!(matches!(err, CoreError::CircularDependency { .. }));
    }

    #[test]
    fn test_panicking_factory_leaves_no_stale_frame() {
        let mut services = ServiceCollection::new();
        services.add_transient_factory::<Greeting, _>(|_| panic!("factory failed"));
        services.add_singleton_factory(|_| Ok(Counter(7)));
        let container = services.build();

        for _ in 0..2 {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| container.resolve::<Greeting>()));
            assert!(outcome.is_err(), "expected the factory to panic, not a cycle error");
        }
        assert_eq!(container.resolve::<Counter>().unwrap().0, 7);
    }

    #[test]
    fn test_factory_error_propagates() {
        let mut services = ServiceCollection::new();
        services.add_singleton_factory::<Greeting, _>(|_| {
            Err(CoreError::registration("test", "boom"))
        });
        let container = services.build();

        let err = container.resolve::<Greeting>().unwrap_err();
        assert!(matches!(err, CoreError::Registration { .. }));
    }
}
