//! Port for persisting captured events.
//!
//! Defines the [`EventSink`] trait implemented by the structured sink in the
//! infrastructure layer. A sink is owned by exactly one writer thread, so
//! implementations only need `Send`; record atomicity comes from that single
//! writer, not from locking on the producer side.

use livelog_domain::LogEvent;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while persisting a record.
///
/// These never reach producers: the writer thread counts them, drops the
/// event and reports through the fallback [`ErrorReporter`](super::error_reporter::ErrorReporter).
#[derive(Error, Debug)]
pub enum SinkWriteError {
    #[error("Failed to open sink destination {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write record: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to flush sink: {0}")]
    Flush(#[source] std::io::Error),

    #[error("Failed to encode record: {0}")]
    Encode(String),

    #[error("Sink is closed")]
    Closed,
}

/// Port for appending events to a durable destination.
pub trait EventSink: Send {
    /// Serialize one event and append it as a single unit.
    fn write(&mut self, event: &LogEvent) -> Result<(), SinkWriteError>;

    /// Push any buffered bytes to the underlying storage.
    fn flush(&mut self) -> Result<(), SinkWriteError>;

    /// Flush and release the destination. Further writes fail with `Closed`.
    fn close(&mut self) -> Result<(), SinkWriteError> {
        self.flush()
    }

    /// Short human-readable description of the destination.
    fn describe(&self) -> String {
        "sink".to_string()
    }
}

/// Sink that accepts and discards everything.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn write(&mut self, _event: &LogEvent) -> Result<(), SinkWriteError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkWriteError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "null".to_string()
    }
}
