//! Sink configuration from TOML (`[sink]` section)

use crate::sink::{Destination, SinkOptions};
use livelog_domain::{FlushPolicy, LogFormat};
use serde::{Deserialize, Serialize};

/// Default destination when nothing is configured.
pub const DEFAULT_DESTINATION: &str = "livelog.log";

/// Raw sink configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    /// Record format (`json` or `logfmt`)
    pub format: LogFormat,
    /// File path, `-`/`stdout`, or `stderr`
    pub destination: String,
    /// `per-event` or `buffered`
    pub flush_policy: FlushPolicy,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            destination: DEFAULT_DESTINATION.to_string(),
            flush_policy: FlushPolicy::default(),
        }
    }
}

impl FileSinkConfig {
    pub fn to_sink_options(&self) -> SinkOptions {
        SinkOptions::new(self.format, Destination::parse(&self.destination))
            .with_flush_policy(self.flush_policy)
    }
}
