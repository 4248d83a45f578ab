//! Application-level configuration.
//!
//! - [`CaptureConfig`]: how a capture session cuts, queues and drains events

pub mod capture_config;

pub use capture_config::CaptureConfig;
