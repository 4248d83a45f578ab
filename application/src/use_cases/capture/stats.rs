//! Capture counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by emitters, the writer and the session.
#[derive(Debug, Default)]
pub struct CaptureCounters {
    captured: AtomicU64,
    written: AtomicU64,
    dropped_queue_full: AtomicU64,
    dropped_sink_error: AtomicU64,
    dropped_after_close: AtomicU64,
    dropped_on_shutdown: AtomicU64,
    sink_errors: AtomicU64,
}

impl CaptureCounters {
    #[inline]
    pub fn record_captured(&self) {
        self.captured.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_queue_full(&self) {
        self.dropped_queue_full.fetch_add(1, Ordering::Relaxed);
    }

    /// A failed write: one sink error, one dropped event.
    #[inline]
    pub fn record_write_failure(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
        self.dropped_sink_error.fetch_add(1, Ordering::Relaxed);
    }

    /// A failed flush: the records were already counted as written.
    #[inline]
    pub fn record_flush_failure(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_after_close(&self, count: u64) {
        self.dropped_after_close.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_shutdown_drops(&self, count: u64) {
        self.dropped_on_shutdown.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            captured: self.captured.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            dropped_queue_full: self.dropped_queue_full.load(Ordering::Relaxed),
            dropped_sink_error: self.dropped_sink_error.load(Ordering::Relaxed),
            dropped_after_close: self.dropped_after_close.load(Ordering::Relaxed),
            dropped_on_shutdown: self.dropped_on_shutdown.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CaptureCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStats {
    /// Events accepted onto the queue.
    pub captured: u64,
    /// Events the sink accepted.
    pub written: u64,
    /// Events dropped because the queue stayed full past the enqueue timeout.
    pub dropped_queue_full: u64,
    /// Events dropped because the sink failed to write them.
    pub dropped_sink_error: u64,
    /// Events emitted after the session started shutting down.
    pub dropped_after_close: u64,
    /// Events still queued when the drain timeout expired.
    pub dropped_on_shutdown: u64,
    /// Write and flush failures reported by the sink.
    pub sink_errors: u64,
}

impl CaptureStats {
    pub fn dropped(&self) -> u64 {
        self.dropped_queue_full
            + self.dropped_sink_error
            + self.dropped_after_close
            + self.dropped_on_shutdown
    }
}
