//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Invalid event source: {0}")]
    InvalidSource(String),

    #[error("Invalid log format: {0} (expected json or logfmt)")]
    InvalidFormat(String),

    #[error("Invalid flush policy: {0} (expected per-event or buffered)")]
    InvalidFlushPolicy(String),

    #[error("Invalid line split mode: {0} (expected per-line or whole-chunk)")]
    InvalidLineSplit(String),

    #[error("Context key '{0}' is reserved for record fields")]
    ReservedContextKey(String),
}

impl DomainError {
    /// Check if this error came from parsing a textual value
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, DomainError::ReservedContextKey(_))
    }
}
