//! Closure-backed sensors.
//!
//! `FnSensor` is the quickest way to plug ad-hoc lookups into the engine: each of
//! the three operations is a plain closure. Any of them may be left unset while
//! the sensor is being assembled; [`Engine::create`](crate::core::engine::Engine::create)
//! refuses sensors that are still incomplete.

use std::{fmt, sync::Arc};

use super::{
    traits::Sensor,
    types::{SensorCall, SensorResult},
};

/// A shared, synchronous sensor callback.
pub type Callback = Arc<dyn Fn() -> SensorResult<String> + Send + Sync>;

#[derive(Clone, Default)]
pub struct FnSensor {
    host_name: Option<Callback>,
    resource_name: Option<Callback>,
    measurement: Option<Callback>,
}

impl FnSensor {
    /// Creates a sensor with all three callbacks set.
    pub fn new<H, R, M>(host_name: H, resource_name: R, measurement: M) -> Self
    where
        H: Fn() -> SensorResult<String> + Send + Sync + 'static,
        R: Fn() -> SensorResult<String> + Send + Sync + 'static,
        M: Fn() -> SensorResult<String> + Send + Sync + 'static,
    {
        Self::default()
            .with_host_name(host_name)
            .with_resource_name(resource_name)
            .with_measurement(measurement)
    }

    pub fn with_host_name<F>(mut self, f: F) -> Self
    where
        F: Fn() -> SensorResult<String> + Send + Sync + 'static,
    {
        self.host_name = Some(Arc::new(f));
        self
    }

    pub fn with_resource_name<F>(mut self, f: F) -> Self
    where
        F: Fn() -> SensorResult<String> + Send + Sync + 'static,
    {
        self.resource_name = Some(Arc::new(f));
        self
    }

    pub fn with_measurement<F>(mut self, f: F) -> Self
    where
        F: Fn() -> SensorResult<String> + Send + Sync + 'static,
    {
        self.measurement = Some(Arc::new(f));
        self
    }

    fn invoke(&self, call: SensorCall) -> SensorResult<String> {
        let callback = match call {
            SensorCall::HostName => &self.host_name,
            SensorCall::ResourceName => &self.resource_name,
            SensorCall::Measurement => &self.measurement,
        };
        match callback {
            Some(f) => f(),
            // Unreachable through the engine, which rejects incomplete sensors.
            None => Err(super::error::SensorError::other(format!(
                "{} callback is not set",
                call
            ))),
        }
    }
}

#[async_trait::async_trait]
impl Sensor for FnSensor {
    async fn host_name(&self) -> SensorResult<String> {
        self.invoke(SensorCall::HostName)
    }

    async fn resource_name(&self) -> SensorResult<String> {
        self.invoke(SensorCall::ResourceName)
    }

    async fn measurement(&self) -> SensorResult<String> {
        self.invoke(SensorCall::Measurement)
    }

    fn unset_call(&self) -> Option<SensorCall> {
        if self.host_name.is_none() {
            Some(SensorCall::HostName)
        } else if self.resource_name.is_none() {
            Some(SensorCall::ResourceName)
        } else if self.measurement.is_none() {
            Some(SensorCall::Measurement)
        } else {
            None
        }
    }
}

impl fmt::Debug for FnSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSensor")
            .field("host_name", &self.host_name.is_some())
            .field("resource_name", &self.resource_name.is_some())
            .field("measurement", &self.measurement.is_some())
            .finish()
    }
}
