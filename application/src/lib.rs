//! Application layer for livelog
//!
//! This crate contains the capture use case, its port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::CaptureConfig;
pub use ports::{
    capture_hook::{CaptureError, CaptureHook},
    error_reporter::{ErrorReporter, NoErrorReporter},
    event_sink::{EventSink, NullEventSink, SinkWriteError},
};
pub use use_cases::capture::{
    CaptureAdapter, CaptureReport, CaptureSession, CaptureStats, QueueTimeoutError, TextEmitter,
};
