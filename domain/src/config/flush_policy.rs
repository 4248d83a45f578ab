//! Flush policy value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// When the sink pushes buffered bytes to the underlying storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlushPolicy {
    /// Flush after every record
    #[default]
    PerEvent,
    /// Flush when the writer goes idle, on request, and on close
    Buffered,
}

impl FlushPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushPolicy::PerEvent => "per-event",
            FlushPolicy::Buffered => "buffered",
        }
    }
}

impl std::fmt::Display for FlushPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FlushPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "per-event" => Ok(FlushPolicy::PerEvent),
            "buffered" => Ok(FlushPolicy::Buffered),
            other => Err(DomainError::InvalidFlushPolicy(other.to_string())),
        }
    }
}
