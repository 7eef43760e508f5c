use super::{error::SensorError, traits::Probe, types::SensorResult};
use crate::register_probe;

const UPTIME_PATH: &str = "/proc/uptime";

/// Parses the first field of `/proc/uptime` into whole seconds.
pub fn parse_uptime(content: &str) -> SensorResult<u64> {
    let raw = content
        .split_whitespace()
        .next()
        .ok_or_else(|| SensorError::InvalidFormat {
            location: UPTIME_PATH.to_string(),
            reason: "file is empty".to_string(),
        })?;

    let seconds = raw.parse::<f64>().map_err(|_| SensorError::ParseError {
        metric: "uptime".to_string(),
        location: UPTIME_PATH.to_string(),
        reason: format!("invalid value: {}", raw),
    })?;

    Ok(seconds as u64)
}

/// Seconds since boot.
#[derive(Debug, Default, Clone, Copy)]
pub struct UptimeProbe;

#[async_trait::async_trait]
impl Probe for UptimeProbe {
    async fn measure(&self) -> SensorResult<String> {
        let content = tokio::fs::read_to_string(UPTIME_PATH)
            .await
            .map_err(|source| SensorError::FileRead {
                path: UPTIME_PATH.to_string(),
                source,
            })?;
        Ok(parse_uptime(&content)?.to_string())
    }
}

register_probe!("uptime", UptimeProbe);
