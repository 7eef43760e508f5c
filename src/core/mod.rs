//! Core runtime: the report engine, the line protocol and the sensors it polls.

pub mod engine;
pub mod protocol;
pub mod sensors;

pub use engine::{Engine, EngineError, StreamError};
