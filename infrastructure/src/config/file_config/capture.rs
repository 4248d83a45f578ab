//! Capture configuration from TOML (`[capture]` section)

use livelog_application::CaptureConfig;
use livelog_domain::LineSplit;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw capture configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCaptureConfig {
    /// `per-line` or `whole-chunk`
    pub line_split: LineSplit,
    pub queue_capacity: usize,
    pub enqueue_timeout_ms: u64,
    pub drain_timeout_ms: u64,
    /// Also write captured stream text to the original stream
    pub tee: bool,
    /// Attach the producing thread's name to each event
    pub include_thread: bool,
    /// Bracket the capture with start/stop marker events
    pub lifecycle_markers: bool,
}

impl Default for FileCaptureConfig {
    fn default() -> Self {
        let defaults = CaptureConfig::default();
        Self {
            line_split: defaults.line_split,
            queue_capacity: defaults.queue_capacity,
            enqueue_timeout_ms: defaults.enqueue_timeout.as_millis() as u64,
            drain_timeout_ms: defaults.drain_timeout.as_millis() as u64,
            tee: true,
            include_thread: defaults.include_thread,
            lifecycle_markers: defaults.lifecycle_markers,
        }
    }
}

impl FileCaptureConfig {
    pub fn to_capture_config(&self) -> CaptureConfig {
        CaptureConfig::default()
            .with_line_split(self.line_split)
            .with_queue_capacity(self.queue_capacity)
            .with_enqueue_timeout(Duration::from_millis(self.enqueue_timeout_ms))
            .with_drain_timeout(Duration::from_millis(self.drain_timeout_ms))
            .with_include_thread(self.include_thread)
            .with_lifecycle_markers(self.lifecycle_markers)
    }
}
