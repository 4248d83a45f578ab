//! Line split value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// How a chunk of captured text is cut into events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineSplit {
    /// One event per line (default)
    #[default]
    PerLine,
    /// One event per captured chunk, possibly multi-line
    WholeChunk,
}

impl LineSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineSplit::PerLine => "per-line",
            LineSplit::WholeChunk => "whole-chunk",
        }
    }
}

impl std::fmt::Display for LineSplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LineSplit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "per-line" | "line" => Ok(LineSplit::PerLine),
            "whole-chunk" | "chunk" => Ok(LineSplit::WholeChunk),
            other => Err(DomainError::InvalidLineSplit(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_kebab_case() {
        let split: LineSplit = serde_json::from_str("\"whole-chunk\"").unwrap();
        assert_eq!(split, LineSplit::WholeChunk);
    }

    #[test]
    fn test_parse() {
        assert_eq!("per-line".parse::<LineSplit>().unwrap(), LineSplit::PerLine);
        assert_eq!("chunk".parse::<LineSplit>().unwrap(), LineSplit::WholeChunk);
        assert!("paragraph".parse::<LineSplit>().is_err());
    }
}
