use super::types::{SensorCall, SensorResult};

/// A source of one load report line per cycle.
///
/// The engine calls the three operations in order (`host_name`, `resource_name`,
/// `measurement`) once per poll and stops at the first failure. Implementations
/// may read files, spawn commands or do anything else that eventually returns;
/// the engine awaits each call before starting the next one.
///
/// Returned strings end up verbatim in a `host:resource:value` line, so they must
/// not contain colons or line breaks.
#[async_trait::async_trait]
pub trait Sensor: Send + Sync {
    /// Name of the host this measurement is reported for.
    async fn host_name(&self) -> SensorResult<String>;

    /// Name of the scheduler resource (complex) being reported.
    async fn resource_name(&self) -> SensorResult<String>;

    /// Current value of the resource.
    async fn measurement(&self) -> SensorResult<String>;

    /// Reports the first operation this sensor cannot answer at all.
    ///
    /// Trait implementations always answer all three, so the default is `None`.
    /// Callback-based sensors override this so that an incomplete sensor is
    /// rejected when the engine is built rather than at poll time.
    fn unset_call(&self) -> Option<SensorCall> {
        None
    }
}

/// A measurement-only source, combined with a host and a resource name by
/// [`ConfiguredSensor`](super::configured::ConfiguredSensor).
#[async_trait::async_trait]
pub trait Probe: Send + Sync + 'static {
    /// Reads the current value, already formatted for the report line.
    async fn measure(&self) -> SensorResult<String>;
}
