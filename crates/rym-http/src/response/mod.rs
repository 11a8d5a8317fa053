#[allow(clippy::module_inception)]
pub mod response;

pub use response::RymResponse;
