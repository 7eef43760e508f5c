use thiserror::Error;

/// Error returned by a single sensor or probe call.
///
/// A `SensorError` never leaves the reporting cycle it was raised in: the engine
/// logs it, drops that sensor's line for the cycle and moves on to the next sensor.
#[derive(Error, Debug)]
pub enum SensorError {
    /// Failed to read a file from disk.
    #[error("Failed to read file {path}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A value was present but could not be parsed.
    #[error("Failed to parse {metric} from {location}: {reason}")]
    ParseError {
        metric: String,
        location: String,
        reason: String,
    },

    /// A required field was not present in the source data.
    #[error("Missing required field: {field} in {location}")]
    MissingField { field: String, location: String },

    /// Data was found but did not conform to the expected format.
    #[error("Invalid format in {location}: {reason}")]
    InvalidFormat { location: String, reason: String },

    /// A required environment variable is unset or not valid unicode.
    #[error("Cannot use ${name}")]
    EnvVar {
        name: String,
        #[source]
        source: std::env::VarError,
    },

    /// An external command could not be spawned.
    #[error("Command '{command}' failed: {source}")]
    CommandExecution {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An external command ran but exited unsuccessfully.
    #[error("Command '{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// Tried to look up a probe by name, but it was not registered.
    #[error("Probe not found for: {0}")]
    ProbeNotFound(String),

    /// Plain I/O failure, handy for callbacks built on `std` APIs.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for callback authors. Prefer a specific variant where one fits.
    #[error("{0}")]
    Other(String),
}

impl SensorError {
    /// Shorthand for [`SensorError::Other`].
    pub fn other(message: impl Into<String>) -> Self {
        SensorError::Other(message.into())
    }
}
