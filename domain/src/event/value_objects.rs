//! Value objects describing a captured event: severity and origin.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Severity of a captured event.
///
/// Raw stream captures carry [`Level::Unset`]; only structured log calls
/// carry a real severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Unset,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Unset => "UNSET",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Level::Unset)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNSET" | "" => Ok(Level::Unset),
            "DEBUG" | "TRACE" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            _ => Err(DomainError::InvalidLevel(s.to_string())),
        }
    }
}

/// Where a captured event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Stdout,
    Stderr,
    Logger,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Stdout => "STDOUT",
            Source::Stderr => "STDERR",
            Source::Logger => "LOGGER",
        }
    }

    /// Whether this source is one of the raw output streams
    pub fn is_stream(&self) -> bool {
        matches!(self, Source::Stdout | Source::Stderr)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STDOUT" => Ok(Source::Stdout),
            "STDERR" => Ok(Source::Stderr),
            "LOGGER" => Ok(Source::Logger),
            _ => Err(DomainError::InvalidSource(s.to_string())),
        }
    }
}
