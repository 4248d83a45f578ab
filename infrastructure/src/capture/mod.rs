//! Capture hooks for the host process.
//!
//! - [`StdStreamHook`]: descriptor-level redirect of stdout/stderr (unix).
//! - [`TracingHook`] + [`CaptureLayer`]: records emitted through `tracing`.

#[cfg(unix)]
mod std_streams;
mod tracing_layer;

#[cfg(unix)]
pub use std_streams::StdStreamHook;
pub use tracing_layer::{CaptureLayer, TracingHook, capture_layer, map_level};
