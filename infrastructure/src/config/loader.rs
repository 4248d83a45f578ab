//! Configuration file loader with multi-source merging

use super::file_config::{ConfigError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// Application directory under the user config dir.
const APP_DIR: &str = "livelog";

/// Project-level config file names, checked in order.
const PROJECT_FILES: &[&str] = &["livelog.toml", ".livelog.toml"];

/// Environment variable prefix, e.g. `LIVELOG_SINK__FORMAT=logfmt`.
const ENV_PREFIX: &str = "LIVELOG_";

/// Shorthand for `sink.destination`.
pub const DESTINATION_ENV: &str = "LIVE_LOGS_FILE_PATH";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `LIVELOG_<SECTION>__<KEY>`, then `LIVE_LOGS_FILE_PATH`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./livelog.toml` or `./.livelog.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/livelog/config.toml`
    /// 5. Default values
    ///
    /// CLI flags are applied by the caller on top of the result.
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        if let Ok(destination) = std::env::var(DESTINATION_ENV)
            && !destination.trim().is_empty()
        {
            figment = figment.merge(Serialized::default("sink.destination", destination));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] {}<SECTION>__<KEY>, {}", ENV_PREFIX, DESTINATION_ENV);

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./livelog.toml or ./.livelog.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use livelog_domain::{FlushPolicy, LineSplit, LogFormat};

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.sink.format, LogFormat::Json);
        assert_eq!(config.capture.queue_capacity, 1000);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("livelog"));
    }

    #[test]
    fn test_project_file_is_merged() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "livelog.toml",
                r#"
[sink]
format = "logfmt"

[capture]
queue_capacity = 8
"#,
            )?;

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.sink.format, LogFormat::Logfmt);
            assert_eq!(config.capture.queue_capacity, 8);
            assert_eq!(config.sink.flush_policy, FlushPolicy::PerEvent);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(".livelog.toml", "[sink]\nformat = \"logfmt\"\n")?;
            jail.create_file("custom.toml", "[sink]\nformat = \"json\"\n")?;

            let explicit = PathBuf::from("custom.toml");
            let config = ConfigLoader::load(Some(&explicit)).map_err(|e| e.to_string())?;
            assert_eq!(config.sink.format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file("livelog.toml", "[capture]\nline_split = \"per-line\"\n")?;
            jail.set_env("LIVELOG_CAPTURE__LINE_SPLIT", "whole-chunk");
            jail.set_env("LIVELOG_SINK__FLUSH_POLICY", "buffered");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.capture.line_split, LineSplit::WholeChunk);
            assert_eq!(config.sink.flush_policy, FlushPolicy::Buffered);
            Ok(())
        });
    }

    #[test]
    fn test_live_logs_file_path_sets_destination() {
        Jail::expect_with(|jail| {
            jail.set_env(DESTINATION_ENV, "/tmp/live.jsonl");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.sink.destination, "/tmp/live.jsonl");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("livelog.toml", "[sink]\nformat = \"xml\"\n")?;

            let result = ConfigLoader::load(None);
            assert!(matches!(result, Err(ConfigError::Load(_))));
            Ok(())
        });
    }
}
