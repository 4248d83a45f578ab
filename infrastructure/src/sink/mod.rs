//! Structured sink: serializes events and appends them to a destination.
//!
//! Provides [`StructuredSink`], the [`EventSink`](livelog_application::EventSink)
//! adapter, and the two record encoders ([`json`], [`logfmt`]).

pub mod json;
pub mod logfmt;
mod structured_sink;

pub use structured_sink::StructuredSink;

use livelog_domain::{FlushPolicy, LogFormat};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where records are appended.
pub enum Destination {
    /// A file, created with its parent directories and opened for append.
    File(PathBuf),
    /// The process's original stdout.
    Stdout,
    /// The process's original stderr.
    Stderr,
    /// Any caller-supplied stream handle.
    Writer {
        name: String,
        writer: Box<dyn Write + Send>,
    },
}

impl Destination {
    /// Parse a configured destination: `-` or `stdout`, `stderr`, or a path.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "-" | "stdout" => Destination::Stdout,
            "stderr" => Destination::Stderr,
            path => Destination::File(PathBuf::from(path)),
        }
    }

    pub fn writer(name: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Destination::Writer {
            name: name.into(),
            writer: Box::new(writer),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Destination::File(path) => path.display().to_string(),
            Destination::Stdout => "stdout".to_string(),
            Destination::Stderr => "stderr".to_string(),
            Destination::Writer { name, .. } => name.clone(),
        }
    }
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::File(path) => f.debug_tuple("File").field(path).finish(),
            Destination::Stdout => f.write_str("Stdout"),
            Destination::Stderr => f.write_str("Stderr"),
            Destination::Writer { name, .. } => f.debug_struct("Writer").field("name", name).finish(),
        }
    }
}

/// Options recognized by [`StructuredSink::configure`].
#[derive(Debug)]
pub struct SinkOptions {
    pub format: LogFormat,
    pub destination: Destination,
    pub flush_policy: FlushPolicy,
}

impl SinkOptions {
    pub fn new(format: LogFormat, destination: Destination) -> Self {
        Self {
            format,
            destination,
            flush_policy: FlushPolicy::default(),
        }
    }

    /// JSON records appended to `path`, flushed per event.
    pub fn json_file(path: impl AsRef<Path>) -> Self {
        Self::new(LogFormat::Json, Destination::File(path.as_ref().to_path_buf()))
    }

    pub fn with_flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.flush_policy = policy;
        self
    }
}
