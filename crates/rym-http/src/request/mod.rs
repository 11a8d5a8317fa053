#[allow(clippy::module_inception)]
pub mod request;

pub use request::RymRequest;
