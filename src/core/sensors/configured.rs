use std::{fmt, sync::Arc};

use super::{
    host::HostSource,
    registry::Probes,
    traits::{Probe, Sensor},
    types::SensorResult,
};
use crate::config::sensors::{SensorEntry, SensorsConfig};

/// A sensor assembled from configuration: a host source, a fixed resource name
/// and a registered probe for the value.
pub struct ConfiguredSensor {
    host: HostSource,
    resource: String,
    probe: Arc<dyn Probe>,
}

impl ConfiguredSensor {
    pub fn new(host: HostSource, resource: impl Into<String>, probe: Arc<dyn Probe>) -> Self {
        Self {
            host,
            resource: resource.into(),
            probe,
        }
    }

    /// Builds the sensor for one configuration entry, looking its probe up in the
    /// global registry.
    pub fn from_entry(entry: &SensorEntry, default_host: &HostSource) -> SensorResult<Self> {
        let probe = Probes::get(&entry.probe)?;
        let host = entry.host.clone().unwrap_or_else(|| default_host.clone());
        Ok(Self::new(host, entry.resource_name(), probe))
    }

    /// Builds all enabled sensors in configuration order.
    pub fn from_config(config: &SensorsConfig) -> SensorResult<Vec<Self>> {
        config
            .enabled
            .iter()
            .map(|entry| Self::from_entry(entry, &config.host))
            .collect()
    }
}

#[async_trait::async_trait]
impl Sensor for ConfiguredSensor {
    async fn host_name(&self) -> SensorResult<String> {
        self.host.resolve().await
    }

    async fn resource_name(&self) -> SensorResult<String> {
        Ok(self.resource.clone())
    }

    async fn measurement(&self) -> SensorResult<String> {
        self.probe.measure().await
    }
}

impl fmt::Debug for ConfiguredSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredSensor")
            .field("host", &self.host)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}
