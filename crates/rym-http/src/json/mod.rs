//! JSON conventions: string escaping and date-only values

pub mod date_only;
pub mod escape;
pub mod options;

pub use date_only::{DateOnly, DATE_ONLY_FORMAT};
pub use escape::{EscapePolicy, StrictFormatter};
pub use options::JsonOptions;
