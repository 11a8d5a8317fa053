#[allow(clippy::module_inception)]
pub mod container;
pub mod collection;
pub mod descriptor;
pub mod scope;

pub use collection::ServiceCollection;
pub use container::Container;
pub use descriptor::{ServiceActivation, ServiceDescriptor, ServiceFactory, ServiceId, ServiceInstance};
pub use scope::ServiceLifetime;
