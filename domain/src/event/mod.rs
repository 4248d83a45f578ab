//! Captured log events.
//!
//! - [`entities::LogEvent`]: one immutable record of captured output
//! - [`value_objects::Level`], [`value_objects::Source`]: severity and origin
//! - [`context::Context`]: ordered scalar metadata flattened into records

pub mod context;
pub mod entities;
pub mod value_objects;
