//! Domain layer for livelog
//!
//! This crate contains the captured event model and the configuration
//! value objects shared by every other layer. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **LogEvent**: one unit of captured output with a timestamp, a level,
//!   a source stream, a message and optional context
//! - **Source**: `STDOUT`, `STDERR` or `LOGGER`
//! - **Level**: `DEBUG` through `CRITICAL`, or `UNSET` for raw stream text

pub mod config;
pub mod core;
pub mod event;

// Re-export commonly used types
pub use config::{FlushPolicy, LineSplit, LogFormat};
pub use core::{clock, error::DomainError};
pub use event::{
    context::{Context, ContextValue, RESERVED_KEYS},
    entities::LogEvent,
    value_objects::{Level, Source},
};
