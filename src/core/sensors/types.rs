use std::fmt;

use super::error::SensorError;

/// Result type shared by every sensor and probe call.
pub type SensorResult<T> = std::result::Result<T, SensorError>;

/// Identifies one of the three calls a sensor answers during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCall {
    HostName,
    ResourceName,
    Measurement,
}

impl SensorCall {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorCall::HostName => "hostname",
            SensorCall::ResourceName => "resource name",
            SensorCall::Measurement => "measurement",
        }
    }
}

impl fmt::Display for SensorCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported load value: a single `host:resource:value` protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub host: String,
    pub resource: String,
    pub value: String,
}

impl Measurement {
    pub fn new(
        host: impl Into<String>,
        resource: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            resource: resource.into(),
            value: value.into(),
        }
    }

    /// Returns the name of the first field that would break the line format,
    /// i.e. one holding a field separator or a line break.
    pub fn ambiguous_field(&self) -> Option<&'static str> {
        let breaks = |s: &str| s.contains([':', '\n', '\r']);
        if breaks(&self.host) {
            Some("host")
        } else if breaks(&self.resource) {
            Some("resource")
        } else if breaks(&self.value) {
            Some("value")
        } else {
            None
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.host, self.resource, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_renders_as_protocol_line() {
        let m = Measurement::new("node01", "load_short", "0.42");
        assert_eq!(m.to_string(), "node01:load_short:0.42");
        assert_eq!(m.ambiguous_field(), None);
    }

    #[test]
    fn ambiguous_fields_are_reported_in_line_order() {
        assert_eq!(
            Measurement::new("a:b", "r", "1").ambiguous_field(),
            Some("host")
        );
        assert_eq!(
            Measurement::new("a", "r", "1\n2").ambiguous_field(),
            Some("value")
        );
    }

    #[test]
    fn call_names_match_diagnostics() {
        assert_eq!(SensorCall::HostName.to_string(), "hostname");
        assert_eq!(SensorCall::ResourceName.to_string(), "resource name");
        assert_eq!(SensorCall::Measurement.to_string(), "measurement");
    }
}
