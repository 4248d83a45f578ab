//! Line-delimited JSON encoding.
//!
//! The record layout is owned by `LogEvent`'s serde impl: `timestamp`,
//! `level`, `source`, `message`, then context keys flattened at top level.

use livelog_application::SinkWriteError;
use livelog_domain::LogEvent;

/// Append one JSON record (without the trailing newline) to `buf`.
pub fn encode(event: &LogEvent, buf: &mut Vec<u8>) -> Result<(), SinkWriteError> {
    serde_json::to_writer(buf, event).map_err(|e| SinkWriteError::Encode(e.to_string()))
}

/// Parse one JSON record back into an event.
pub fn decode(line: &str) -> Result<LogEvent, serde_json::Error> {
    serde_json::from_str(line.trim_end_matches(['\r', '\n']))
}
