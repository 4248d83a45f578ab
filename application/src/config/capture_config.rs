//! Capture parameters: queueing, splitting and shutdown control.
//!
//! [`CaptureConfig`] groups the static parameters that control a
//! [`CaptureSession`](crate::use_cases::capture::CaptureSession). Host-specific
//! knobs such as teeing to the original streams live with the hooks that
//! implement them.

use livelog_domain::LineSplit;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Capture session parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// How captured text is cut into events.
    pub line_split: LineSplit,
    /// Capacity of the bounded queue between producers and the writer.
    pub queue_capacity: usize,
    /// Longest a producer waits for queue space before the event is dropped.
    pub enqueue_timeout: Duration,
    /// Longest `uninstall` waits for the writer to drain the queue.
    pub drain_timeout: Duration,
    /// Attach the producing thread's name to each event's context.
    pub include_thread: bool,
    /// Write `capture started` / `capture stopped` LOGGER events around the
    /// session.
    #[serde(default)]
    pub lifecycle_markers: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            line_split: LineSplit::PerLine,
            queue_capacity: 1000,
            enqueue_timeout: Duration::from_millis(100),
            drain_timeout: Duration::from_secs(5),
            include_thread: false,
            lifecycle_markers: false,
        }
    }
}

impl CaptureConfig {
    // ==================== Builder Methods ====================

    pub fn with_line_split(mut self, line_split: LineSplit) -> Self {
        self.line_split = line_split;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.enqueue_timeout = timeout;
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn with_include_thread(mut self, include: bool) -> Self {
        self.include_thread = include;
        self
    }

    pub fn with_lifecycle_markers(mut self, enabled: bool) -> Self {
        self.lifecycle_markers = enabled;
        self
    }

    /// Queue capacity clamped to at least one slot.
    pub fn effective_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }
}
