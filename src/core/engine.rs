//! Load report engine.
//!
//! The `Engine` owns an ordered list of sensors and drives the scheduler
//! protocol: it waits for a trigger line, polls every sensor in registration
//! order, writes one framed report and waits again. It stops on `quit` or when
//! its input goes away.

use std::{error::Error as StdError, future::Future, io};

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::{debug, error, info, warn};

use super::{
    protocol::{Command, CommandReader, ReportWriter},
    sensors::{Measurement, Sensor, SensorCall, SensorResult},
};

/// Errors detected while building an engine.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// A sensor cannot answer one of its three calls.
    #[error("sensor #{index}: {call} function is not set")]
    MissingCallback { index: usize, call: SensorCall },
}

/// Why the protocol loop stopped, other than a `quit` command.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The scheduler closed our input.
    #[error("input closed while waiting for a command")]
    EndOfInput,

    #[error("failed to read command: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write report: {0}")]
    Write(#[source] io::Error),
}

/// Polls sensors on behalf of the scheduler.
pub struct Engine {
    sensors: Vec<Box<dyn Sensor>>,
}

impl Engine {
    /// Builds an engine reporting `sensors` in the given order.
    ///
    /// An empty list is allowed and yields empty reports.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingCallback` for the first sensor that cannot
    /// answer one of its calls. No engine is built in that case.
    pub fn create<I>(sensors: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = Box<dyn Sensor>>,
    {
        let sensors: Vec<_> = sensors.into_iter().collect();

        for (index, sensor) in sensors.iter().enumerate() {
            if let Some(call) = sensor.unset_call() {
                return Err(EngineError::MissingCallback { index, call });
            }
        }

        Ok(Self { sensors })
    }

    /// Number of registered sensors.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Runs the protocol on the process's stdin and stdout.
    pub async fn run_stdio(&self) -> Result<(), StreamError> {
        self.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Runs the protocol until the scheduler sends `quit` (`Ok`) or the input
    /// ends or fails (`Err`). A failed write also ends the loop, since the
    /// scheduler can no longer parse what follows.
    ///
    /// Each report is complete and flushed before the next line is read.
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<(), StreamError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut commands = CommandReader::new(input);
        let mut writer = ReportWriter::new(output);
        let mut reports: u64 = 0;

        loop {
            let command = match commands.next_command().await {
                Ok(Some(command)) => command,
                Ok(None) => {
                    warn!("Input closed after {} reports", reports);
                    return Err(StreamError::EndOfInput);
                }
                Err(e) => {
                    error!("Failed to read from input: {}", e);
                    return Err(StreamError::Read(e));
                }
            };

            match command {
                Command::Quit => {
                    info!("Received quit after {} reports, shutting down", reports);
                    return Ok(());
                }
                Command::Poll => {
                    reports += 1;
                    debug!(report = reports, "Load report requested");
                    self.report(&mut writer).await.map_err(|e| {
                        error!("Failed to write report: {}", e);
                        StreamError::Write(e)
                    })?;
                }
            }
        }
    }

    async fn report<W>(&self, writer: &mut ReportWriter<W>) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.begin().await?;
        for (index, sensor) in self.sensors.iter().enumerate() {
            if let Some(m) = self.poll(index, sensor.as_ref()).await {
                writer.measurement(&m).await?;
            }
        }
        writer.end().await
    }

    /// Asks one sensor for its line. Stops at the first failing call.
    async fn poll(&self, index: usize, sensor: &dyn Sensor) -> Option<Measurement> {
        let host = call(index, SensorCall::HostName, sensor.host_name()).await?;
        let resource = call(index, SensorCall::ResourceName, sensor.resource_name()).await?;
        let value = call(index, SensorCall::Measurement, sensor.measurement()).await?;

        let measurement = Measurement::new(host, resource, value);
        if let Some(field) = measurement.ambiguous_field() {
            warn!(
                sensor = index,
                "Sensor {} {} contains ':' or a line break, the scheduler may misparse '{}'",
                index,
                field,
                measurement
            );
        }
        Some(measurement)
    }
}

async fn call<F>(index: usize, which: SensorCall, fut: F) -> Option<String>
where
    F: Future<Output = SensorResult<String>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            error!(
                sensor = index,
                "error during {} function call: {}",
                which,
                error_chain(&e)
            );
            None
        }
    }
}

/// Renders an error with all of its sources, outermost first.
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
