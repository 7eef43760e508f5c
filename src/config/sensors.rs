//! Configuration of the sensors reported to the scheduler.
//!
//! Each entry binds a registered probe to a scheduler resource name. Entries are
//! reported in the order they appear in the file.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::sensors::{registry::Probes, HostSource};

/// One reported resource.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SensorEntry {
    /// Name of a registered probe, e.g. `load_short` or `mem_free`.
    #[validate(custom(function = "validate_probe"))]
    pub probe: String,

    /// Resource (complex) name reported to the scheduler. Defaults to the probe name.
    #[validate(custom(function = "validate_resource"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Host source for this entry only. Defaults to `[sensors].host`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostSource>,
}

impl SensorEntry {
    pub fn new(probe: impl Into<String>) -> Self {
        Self {
            probe: probe.into(),
            resource: None,
            host: None,
        }
    }

    /// Resource name as it appears in the report line.
    pub fn resource_name(&self) -> &str {
        self.resource.as_deref().unwrap_or(&self.probe)
    }
}

/// The `[sensors]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct SensorsConfig {
    /// Host source used by entries without their own `host`.
    pub host: HostSource,

    /// Reported sensors, in report order. May be empty.
    #[validate(nested)]
    pub enabled: Vec<SensorEntry>,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            host: HostSource::default(),
            enabled: ["load_short", "load_medium", "load_long", "mem_free", "num_proc"]
                .into_iter()
                .map(SensorEntry::new)
                .collect(),
        }
    }
}

impl SensorsConfig {
    /// Resource names of the enabled sensors, in report order.
    pub fn resource_names(&self) -> Vec<&str> {
        self.enabled.iter().map(SensorEntry::resource_name).collect()
    }
}

/// Probe names must refer to a registered probe.
fn validate_probe(name: &str) -> Result<(), ValidationError> {
    if Probes::exists(name) {
        return Ok(());
    }
    let mut err = ValidationError::new("unknown_probe");
    err.message = Some(
        format!(
            "Unknown probe '{}', available: {}",
            name,
            Probes::list().join(", ")
        )
        .into(),
    );
    Err(err)
}

/// Resource names end up between colons in the report line.
fn validate_resource(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        let mut err = ValidationError::new("empty_resource");
        err.message = Some("Resource name must not be empty".into());
        return Err(err);
    }
    if name.contains(':') || name.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("invalid_resource");
        err.message = Some(
            format!(
                "Resource name '{}' must not contain ':' or whitespace",
                name
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SensorsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.host, HostSource::Os);
        assert_eq!(
            config.resource_names(),
            vec!["load_short", "load_medium", "load_long", "mem_free", "num_proc"]
        );
    }

    #[test]
    fn parses_entries_in_order() {
        let config: SensorsConfig = toml::from_str(
            r#"
            host = "grid"

            [[enabled]]
            probe = "mem_free"

            [[enabled]]
            probe = "load_short"
            resource = "np_load_short"
            host = { static = "gateway" }
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.host, HostSource::Grid);
        assert_eq!(config.resource_names(), vec!["mem_free", "np_load_short"]);
        assert_eq!(
            config.enabled[1].host,
            Some(HostSource::Static("gateway".into()))
        );
    }

    #[test]
    fn empty_sensor_list_is_allowed() {
        let config: SensorsConfig = toml::from_str("enabled = []").unwrap();
        assert!(config.enabled.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_probe_fails_validation() {
        let config = SensorsConfig {
            host: HostSource::Os,
            enabled: vec![SensorEntry::new("warp_drive")],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Unknown probe 'warp_drive'"));
    }

    #[test]
    fn resource_with_separator_fails_validation() {
        for bad in ["", "mem:free", "mem free"] {
            let mut entry = SensorEntry::new("mem_free");
            entry.resource = Some(bad.to_string());
            assert!(entry.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn serializes_without_unset_overrides() {
        let text = toml::to_string(&SensorsConfig::default()).unwrap();
        assert!(!text.contains("resource"));
        let back: SensorsConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, SensorsConfig::default());
    }
}
