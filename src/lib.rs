//! loadsensor — custom load reporting for Grid Engine style schedulers
//!
//! The scheduler starts a load sensor on each execution host, writes a line to
//! its stdin at every load report interval, and expects a framed block of
//! `host:resource:value` lines back on stdout:
//!
//! ```text
//! begin
//! node01:load_short:0.42
//! node01:mem_free:11823M
//! end
//! ```
//!
//! A `quit` line ends the sensor.
//!
//! ## Modules
//!
//! * `core` — Protocol engine and sensors:
//!   - `Engine`: validates the sensor list and runs the poll loop
//!   - `protocol`: command parsing and report framing
//!   - `sensors`: the `Sensor` trait, closure-backed `FnSensor`, host lookups
//!     and the built-in `/proc` probes behind `ConfiguredSensor`
//!
//! * `config` — TOML configuration (logging and sensor list) validated with
//!   the `validator` crate.
//!
//! * `logger` — `tracing` subscriber setup. Logs go to stderr and optionally
//!   to systemd journald; stdout is reserved for the protocol.
//!
//! ## Embedding
//!
//! ```no_run
//! use loadsensor::core::{sensors::{FnSensor, Sensor}, Engine};
//!
//! # async fn example() {
//! let sensors: Vec<Box<dyn Sensor>> = vec![Box::new(FnSensor::new(
//!     || Ok("node01".to_string()),
//!     || Ok("license_free".to_string()),
//!     || Ok("3".to_string()),
//! ))];
//! let engine = Engine::create(sensors).expect("all callbacks are set");
//! let clean = engine.run_stdio().await.is_ok();
//! std::process::exit(if clean { 0 } else { 1 });
//! # }
//! ```

pub mod config;
pub mod core;
pub mod logger;
