//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod flush_policy;
mod line_split;
mod log_format;

pub use flush_policy::FlushPolicy;
pub use line_split::LineSplit;
pub use log_format::LogFormat;
