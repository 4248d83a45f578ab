//! Configuration file loading for livelog
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `LIVELOG_<SECTION>__<KEY>` and `LIVE_LOGS_FILE_PATH`
//! 2. `--config <path>` specified file
//! 3. Project root: `./livelog.toml` or `./.livelog.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/livelog/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigError, ConfigValidationError, DEFAULT_DESTINATION, FileCaptureConfig, FileConfig,
    FileSinkConfig,
};
pub use loader::{ConfigLoader, DESTINATION_ENV};
