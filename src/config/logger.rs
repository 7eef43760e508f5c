//! The `[logger]` section.
//!
//! All diagnostics, including per-sensor failures, go to stderr or journald.
//! Nothing configured here can write to stdout, which carries the scheduler
//! protocol.

use serde::{Deserialize, Serialize};
use time::{
    error::InvalidFormatDescription,
    format_description::{self, OwnedFormatItem},
};
use validator::{Validate, ValidationError};

/// Available formats for console log output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    #[serde(rename = "compact")]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

/// How console log lines are timestamped. Always UTC.
///
/// ```toml
/// timestamp_format = "unix"
/// timestamp_format = { custom = "[hour]:[minute]:[second]" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    #[default]
    Rfc3339,
    /// Seconds since the epoch.
    Unix,
    /// A `time` format description, e.g. `[year]-[month]-[day] [hour]:[minute]`.
    Custom(String),
}

impl TimestampFormat {
    /// Parses a custom description into a reusable format item.
    pub fn parse_custom(description: &str) -> Result<OwnedFormatItem, InvalidFormatDescription> {
        format_description::parse_owned::<2>(description)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Global log level. Valid values: trace, debug, info, warn, error (case-insensitive).
    #[validate(custom(function = "validate_log_level"))]
    pub level: String,

    /// Optional stderr output configuration.
    #[validate(nested)]
    pub console: Option<ConsoleConfig>,

    /// Optional systemd journald output configuration.
    #[validate(nested)]
    pub journald: Option<JournaldConfig>,

    /// Timestamp of console log lines.
    #[validate(custom(function = "validate_timestamp_format"))]
    pub timestamp_format: TimestampFormat,
}

fn validate_timestamp_format(format: &TimestampFormat) -> Result<(), ValidationError> {
    let TimestampFormat::Custom(description) = format else {
        return Ok(());
    };
    let reason = if description.is_empty() {
        "Custom timestamp format cannot be empty".to_string()
    } else {
        match TimestampFormat::parse_custom(description) {
            Ok(_) => return Ok(()),
            Err(e) => format!("Invalid timestamp format '{}': {}", description, e),
        }
    };
    let mut err = ValidationError::new("invalid_timestamp_format");
    err.message = Some(reason.into());
    Err(err)
}

/// Validates that the provided log level is one of the supported values.
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => {
            let mut err = ValidationError::new("invalid_log_level");
            err.message = Some(format!("Invalid log level: {}", level).into());
            Err(err)
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: "info".to_string(),
            console: Some(ConsoleConfig::default()),
            journald: Some(JournaldConfig::default()),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

/// Console (stderr) output.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: LogFormat,
    pub show_target: bool,
    pub show_thread_ids: bool,

    /// Enable ANSI color codes. The scheduler usually redirects stderr to a
    /// file, so this is off by default.
    pub ansi_colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            enabled: true,
            format: LogFormat::default(),
            show_target: false,
            show_thread_ids: false,
            ansi_colors: false,
        }
    }
}

/// Systemd journald output.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct JournaldConfig {
    #[serde(default)]
    pub enabled: bool,

    /// `SYSLOG_IDENTIFIER` of the journal entries.
    #[validate(length(min = 1))]
    pub identifier: String,
}

impl Default for JournaldConfig {
    fn default() -> Self {
        JournaldConfig {
            enabled: false,
            identifier: "loadsensor".to_string(),
        }
    }
}
