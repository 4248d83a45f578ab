//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod capture;
mod sink;

pub use capture::FileCaptureConfig;
pub use sink::{DEFAULT_DESTINATION, FileSinkConfig};

use livelog_application::CaptureConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sink::SinkOptions;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("capture.queue_capacity cannot be 0")]
    ZeroQueueCapacity,

    #[error("sink.destination cannot be empty")]
    EmptyDestination,
}

/// Errors raised while producing the effective configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Sink settings
    pub sink: FileSinkConfig,
    /// Capture settings
    pub capture: FileCaptureConfig,
}

impl FileConfig {
    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.capture.queue_capacity == 0 {
            return Err(ConfigValidationError::ZeroQueueCapacity);
        }
        if self.sink.destination.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDestination);
        }
        Ok(())
    }

    pub fn to_capture_config(&self) -> CaptureConfig {
        self.capture.to_capture_config()
    }

    pub fn to_sink_options(&self) -> SinkOptions {
        self.sink.to_sink_options()
    }
}
