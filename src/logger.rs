//! Installs the `tracing` subscriber: a stderr layer and/or a journald layer.
//! Stdout is never used, it carries the scheduler protocol.

use std::{fmt as stdfmt, io};

use thiserror::Error;
use time::{
    format_description::{well_known::Rfc3339, OwnedFormatItem},
    OffsetDateTime,
};
use tracing::instrument;
use tracing_subscriber::{
    fmt::{self, format::Writer, time::FormatTime},
    prelude::*,
    EnvFilter, Layer,
};
use validator::{Validate, ValidationErrors};

use crate::{
    config::logger::{ConsoleConfig, LogFormat, LoggerConfig, TimestampFormat},
    print_info, print_warn,
};

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Logger configuration validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    /// Journald socket failure.
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("No logging layers were configured or successfully initialized")]
    NoLayersConfigured,

    /// A global subscriber was already installed.
    #[error("Logger initialization error: {0}")]
    InitializationError(String),
}

/// Timestamps console lines in UTC according to `TimestampFormat`.
#[derive(Debug, Clone)]
pub enum LogClock {
    Rfc3339,
    Unix,
    Custom(OwnedFormatItem),
}

impl LogClock {
    pub fn new(format: &TimestampFormat) -> Result<Self, LoggerError> {
        Ok(match format {
            TimestampFormat::Rfc3339 => LogClock::Rfc3339,
            TimestampFormat::Unix => LogClock::Unix,
            TimestampFormat::Custom(description) => LogClock::Custom(
                TimestampFormat::parse_custom(description)
                    .map_err(|e| LoggerError::InitializationError(e.to_string()))?,
            ),
        })
    }

    fn stamp(&self, now: OffsetDateTime) -> Result<String, time::error::Format> {
        match self {
            LogClock::Rfc3339 => now.format(&Rfc3339),
            LogClock::Unix => Ok(now.unix_timestamp().to_string()),
            LogClock::Custom(items) => now.format(items),
        }
    }
}

impl FormatTime for LogClock {
    fn format_time(&self, w: &mut Writer<'_>) -> stdfmt::Result {
        let stamp = self
            .stamp(OffsetDateTime::now_utc())
            .map_err(|_| stdfmt::Error)?;
        w.write_str(&stamp)
    }
}

pub struct LoggerManager {
    config: LoggerConfig,
    clock: LogClock,
}

impl LoggerManager {
    /// Validates `config` and prepares its timestamp format.
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        config.validate()?;
        let clock = LogClock::new(&config.timestamp_format)?;

        Ok(LoggerManager { config, clock })
    }

    /// Installs the global `tracing` subscriber. Call once, before the engine
    /// starts.
    ///
    /// A journald failure is tolerated while console output is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if no layer could be created or a subscriber is already set.
    #[instrument(skip(self))]
    pub fn init(&self) -> Result<(), LoggerError> {
        let layers = self.build_layers()?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|e| LoggerError::InitializationError(e.to_string()))
    }

    fn build_layers(&self) -> Result<Vec<BoxedLayer>, LoggerError> {
        let mut layers = Vec::new();

        if let Some(console_config) = self.config.console.as_ref().filter(|c| c.enabled) {
            layers.push(self.init_console_logger(console_config, self.filter()));
        }

        if let Some(journald_config) = self.config.journald.as_ref().filter(|j| j.enabled) {
            match self.init_journald_logger(&journald_config.identifier) {
                Ok(layer) => {
                    layers.push(layer);
                    print_info!(
                        "Systemd journald logger initialized with identifier: {}",
                        journald_config.identifier
                    );
                }
                Err(e) => {
                    print_warn!("Failed to initialize systemd journald logger: {}", e);
                    if layers.is_empty() {
                        return Err(e);
                    }
                }
            }
        }

        if layers.is_empty() {
            print_warn!("No logging layers were initialized. Please check your configuration.");
            return Err(LoggerError::NoLayersConfigured);
        }
        Ok(layers)
    }

    /// `RUST_LOG` wins over the configured level.
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.config.level))
    }

    fn init_console_logger(&self, config: &ConsoleConfig, filter: EnvFilter) -> BoxedLayer {
        let layer = fmt::layer()
            .with_timer(self.clock.clone())
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .with_ansi(config.ansi_colors)
            .with_writer(io::stderr);

        match config.format {
            LogFormat::Json => layer.json().with_filter(filter).boxed(),
            LogFormat::Pretty => layer.pretty().with_filter(filter).boxed(),
            LogFormat::Compact => layer.compact().with_filter(filter).boxed(),
        }
    }

    fn init_journald_logger(&self, identifier: &str) -> Result<BoxedLayer, LoggerError> {
        let journald_layer =
            tracing_journald::layer()?.with_syslog_identifier(identifier.to_string());
        Ok(journald_layer.with_filter(self.filter()).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::logger::JournaldConfig;

    #[test]
    fn invalid_config_is_rejected() {
        let config = LoggerConfig {
            level: "chatty".into(),
            ..Default::default()
        };
        assert!(matches!(
            LoggerManager::new(config),
            Err(LoggerError::ValidationError(_))
        ));
    }

    #[test]
    fn all_outputs_disabled_is_an_error() {
        let config = LoggerConfig {
            console: None,
            journald: Some(JournaldConfig::default()),
            ..Default::default()
        };
        let manager = LoggerManager::new(config).unwrap();
        assert!(matches!(
            manager.build_layers(),
            Err(LoggerError::NoLayersConfigured)
        ));
    }

    #[test]
    fn clock_follows_timestamp_format() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();

        let rfc = LogClock::new(&TimestampFormat::Rfc3339).unwrap();
        assert_eq!(rfc.stamp(now).unwrap(), "2023-11-14T22:13:20Z");

        let unix = LogClock::new(&TimestampFormat::Unix).unwrap();
        assert_eq!(unix.stamp(now).unwrap(), "1700000000");

        let custom = LogClock::new(&TimestampFormat::Custom("[hour]:[minute]".into())).unwrap();
        assert_eq!(custom.stamp(now).unwrap(), "22:13");
    }

    #[test]
    fn custom_timestamp_reaches_the_manager() {
        let config = LoggerConfig {
            timestamp_format: TimestampFormat::Custom("[year]".into()),
            ..Default::default()
        };
        let manager = LoggerManager::new(config).unwrap();
        assert!(matches!(manager.clock, LogClock::Custom(_)));

        let config = LoggerConfig {
            timestamp_format: TimestampFormat::Custom("[year".into()),
            ..Default::default()
        };
        assert!(matches!(
            LoggerManager::new(config),
            Err(LoggerError::ValidationError(_))
        ));
    }

    #[test]
    fn console_layer_is_built_for_every_format() {
        for format in [LogFormat::Compact, LogFormat::Pretty, LogFormat::Json] {
            let config = LoggerConfig {
                console: Some(ConsoleConfig {
                    format,
                    ..Default::default()
                }),
                journald: None,
                ..Default::default()
            };
            let manager = LoggerManager::new(config).unwrap();
            assert_eq!(manager.build_layers().unwrap().len(), 1);
        }
    }
}
