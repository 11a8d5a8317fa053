pub mod status;

pub use status::StatusController;

use rym_http::ControllerRegistry;

/// Every controller the API exposes
pub fn registry() -> ControllerRegistry {
    ControllerRegistry::new().with(StatusController)
}
