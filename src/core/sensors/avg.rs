use super::{error::SensorError, traits::Probe, types::SensorResult};
use crate::register_probe;

const LOADAVG_PATH: &str = "/proc/loadavg";

/// Parsed contents of `/proc/loadavg`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadAverage {
    pub one_minute: f64,
    pub five_minutes: f64,
    pub fifteen_minutes: f64,
    pub running_processes: u32,
    pub total_processes: u32,
}

impl LoadAverage {
    pub async fn read() -> SensorResult<Self> {
        let content = tokio::fs::read_to_string(LOADAVG_PATH)
            .await
            .map_err(|source| SensorError::FileRead {
                path: LOADAVG_PATH.to_string(),
                source,
            })?;
        Self::parse(&content)
    }

    /// Parses a line such as `1.23 1.45 1.67 1/234 12345`.
    pub fn parse(content: &str) -> SensorResult<Self> {
        let parts: Vec<&str> = content.split_whitespace().collect();
        if parts.len() < 5 {
            return Err(SensorError::InvalidFormat {
                location: LOADAVG_PATH.to_string(),
                reason: "Expected at least 5 fields".to_string(),
            });
        }

        let (running, total) =
            parts[3]
                .split_once('/')
                .ok_or_else(|| SensorError::InvalidFormat {
                    location: LOADAVG_PATH.to_string(),
                    reason: "process field must be in format 'running/total'".to_string(),
                })?;

        Ok(LoadAverage {
            one_minute: parse_field("one_minute", parts[0])?,
            five_minutes: parse_field("five_minutes", parts[1])?,
            fifteen_minutes: parse_field("fifteen_minutes", parts[2])?,
            running_processes: parse_field("running_processes", running)?,
            total_processes: parse_field("total_processes", total)?,
        })
    }
}

fn parse_field<T: std::str::FromStr>(metric: &str, raw: &str) -> SensorResult<T> {
    raw.parse::<T>().map_err(|_| SensorError::ParseError {
        metric: metric.to_string(),
        location: LOADAVG_PATH.to_string(),
        reason: format!("invalid value: {}", raw),
    })
}

/// Averaging window of a load value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadWindow {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
}

/// Reports one load average window with two decimals, matching `uptime(1)`.
#[derive(Debug, Clone, Copy)]
pub struct LoadAverageProbe {
    window: LoadWindow,
}

impl LoadAverageProbe {
    pub fn new(window: LoadWindow) -> Self {
        Self { window }
    }

    fn format(&self, load: &LoadAverage) -> String {
        let value = match self.window {
            LoadWindow::OneMinute => load.one_minute,
            LoadWindow::FiveMinutes => load.five_minutes,
            LoadWindow::FifteenMinutes => load.fifteen_minutes,
        };
        format!("{:.2}", value)
    }
}

#[async_trait::async_trait]
impl Probe for LoadAverageProbe {
    async fn measure(&self) -> SensorResult<String> {
        Ok(self.format(&LoadAverage::read().await?))
    }
}

/// Reports the total number of processes (scheduling entities) on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCountProbe;

#[async_trait::async_trait]
impl Probe for ProcessCountProbe {
    async fn measure(&self) -> SensorResult<String> {
        Ok(LoadAverage::read().await?.total_processes.to_string())
    }
}

register_probe!("load_short", LoadAverageProbe::new(LoadWindow::OneMinute));
register_probe!("load_medium", LoadAverageProbe::new(LoadWindow::FiveMinutes));
register_probe!("load_long", LoadAverageProbe::new(LoadWindow::FifteenMinutes));
register_probe!("num_proc", ProcessCountProbe);
