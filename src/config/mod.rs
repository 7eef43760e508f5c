//! Application configuration loading, validation, and management.
//!
//! This module provides the top-level `Config` structure that aggregates the
//! logging and sensor configurations. It handles locating and loading the TOML
//! file and validating it. The configuration is loaded once at startup and stays
//! immutable afterwards.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::{logger::LoggerConfig, sensors::SensorsConfig};

pub mod logger;
pub mod sensors;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "LOADSENSOR_CONFIG";

/// Location checked when `LOADSENSOR_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/loadsensor/config.toml";

/// Macros for printing timestamped messages before the tracing subscriber is
/// initialized. They write to stderr: stdout belongs to the scheduler protocol.
#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        $crate::print_status!(console::style("INFO").green(), $($arg)*)
    };
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => {
        $crate::print_status!(console::style("WARN").yellow(), $($arg)*)
    };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::print_status!(console::style("ERROR").red(), $($arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! print_status {
    ($level:expr, $($arg:tt)*) => {
        eprintln!("{}  {} {}",
            console::Style::new().dim().for_stderr().apply_to(
                time::OffsetDateTime::now_utc()
                    .format(&time::format_description::well_known::Rfc3339)
                    .unwrap_or_default()
            ),
            $level.for_stderr(),
            format_args!($($arg)*)
        );
    };
}

/// Errors that can occur during configuration loading, parsing or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Generic configuration-related error with a descriptive message.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error while accessing configuration files.
    #[error("IO error while reading configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// Failure to parse the TOML configuration file.
    #[error("Parse error while reading configuration: {0}")]
    ParseError(String),

    /// Validation failure after successful parsing.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Top-level application configuration.
#[derive(Serialize, Deserialize, Debug, Validate, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging subsystem configuration.
    #[validate(nested)]
    pub logger: LoggerConfig,

    /// Reported sensors.
    #[validate(nested)]
    pub sensors: SensorsConfig,
}

impl Config {
    /// Locates and loads the configuration.
    ///
    /// Priority:
    /// 1. `LOADSENSOR_CONFIG` environment variable (the file must exist)
    /// 2. `/etc/loadsensor/config.toml`
    /// 3. built-in defaults
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a configured file cannot be read, parsed, or
    /// validated.
    pub fn new() -> Result<Self, ConfigError> {
        match Self::get_config_path() {
            Some(path) => Self::load(&path),
            None => {
                print_warn!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    fn get_config_path() -> Option<PathBuf> {
        if let Ok(config_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(config_path);
            print_info!("Using config from {}: {}", CONFIG_ENV, path.display());
            return Some(path);
        }

        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            print_info!("Using default config path: {}", fallback.display());
            return Some(fallback.to_path_buf());
        }

        None
    }

    /// Loads and validates configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Propagates IO, parsing, and validation errors as `ConfigError`.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Config(format!(
                "configuration file {} does not exist",
                path.display()
            )));
        }

        let config_str = fs::read_to_string(path)?;
        let config = Self::parse(&config_str)?;

        print_info!("Successfully loaded config from: {}", path.display());
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for malformed TOML and `ValidationError` for values
    /// that fail validation.
    pub fn parse(text: &str) -> Result<Config, ConfigError> {
        let config: Config =
            toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::sensors::HostSource;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn parses_full_file() {
        let config = Config::parse(
            r#"
            [logger]
            level = "debug"

            [logger.console]
            enabled = true
            format = "json"
            ansi_colors = false

            [sensors]
            host = { static = "exec01" }

            [[sensors.enabled]]
            probe = "uptime"
            resource = "uptime_s"
            "#,
        )
        .unwrap();

        assert_eq!(config.logger.level, "debug");
        assert_eq!(config.sensors.host, HostSource::Static("exec01".into()));
        assert_eq!(config.sensors.resource_names(), vec!["uptime_s"]);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = Config::parse("[sensors\nhost = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_values_are_validation_errors() {
        let err = Config::parse("[logger]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = Config::parse("[[sensors.enabled]]\nprobe = \"nope\"").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("nope")));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = Config::load(Path::new("/nonexistent/loadsensor.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn loads_shipped_example() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/loadsensor.toml");
        let config = Config::load(&path).unwrap();
        assert!(!config.sensors.enabled.is_empty());
    }
}
