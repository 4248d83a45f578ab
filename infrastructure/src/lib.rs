//! Infrastructure layer for livelog
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the structured sink, the host capture hooks,
//! the fallback reporter, and configuration file loading.

pub mod capture;
pub mod config;
pub mod platform;
pub mod reporting;
pub mod sink;

// Re-export commonly used types
#[cfg(unix)]
pub use capture::StdStreamHook;
pub use capture::{CaptureLayer, TracingHook, capture_layer};
pub use config::{
    ConfigError, ConfigLoader, ConfigValidationError, FileCaptureConfig, FileConfig,
    FileSinkConfig,
};
pub use reporting::StderrReporter;
pub use sink::{Destination, SinkOptions, StructuredSink};
