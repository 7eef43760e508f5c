//! Sensors and the built-in probes behind them.
//!
//! A [`Sensor`] answers the three questions of one report line: which host,
//! which resource, which value. Callers either implement the trait directly,
//! wrap closures in an [`FnSensor`], or let configuration assemble a
//! [`ConfiguredSensor`] from a registered [`Probe`].

/// Load average and process count probes (`/proc/loadavg`).
pub mod avg;

/// Closure-backed sensors.
pub mod callback;

/// Sensors assembled from configuration entries.
pub mod configured;

/// Error type shared by sensors and probes.
pub mod error;

/// Host identity lookups (OS and Grid Engine).
pub mod host;

/// Memory probes (`/proc/meminfo`).
pub mod ram;

/// Probe registry and the `register_probe!` macro.
pub mod registry;

/// The `Sensor` and `Probe` traits.
pub mod traits;

/// Shared result alias, call identifiers and the measurement line type.
pub mod types;

/// Uptime probe (`/proc/uptime`).
pub mod uptime;

pub use callback::FnSensor;
pub use configured::ConfiguredSensor;
pub use error::SensorError;
pub use host::{GridEngine, HostSource};
pub use registry::{ProbeRegistry, Probes};
pub use traits::{Probe, Sensor};
pub use types::{Measurement, SensorCall, SensorResult};
