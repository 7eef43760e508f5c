use std::collections::HashMap;

use super::{error::SensorError, traits::Probe, types::SensorResult};
use crate::register_probe;

const MEMINFO_PATH: &str = "/proc/meminfo";

/// The subset of `/proc/meminfo` the memory probes report, in kB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    pub total_kb: u64,
    pub available_kb: u64,
    pub swap_free_kb: u64,
}

impl MemoryStats {
    pub async fn read() -> SensorResult<Self> {
        let content = tokio::fs::read_to_string(MEMINFO_PATH)
            .await
            .map_err(|source| SensorError::FileRead {
                path: MEMINFO_PATH.to_string(),
                source,
            })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> SensorResult<Self> {
        let mut fields = HashMap::new();
        for line in content.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            // Values are "<n> kB"; HugePages counters carry no unit.
            let Some(raw) = rest.split_whitespace().next() else {
                continue;
            };
            let value = raw.parse::<u64>().map_err(|_| SensorError::ParseError {
                metric: key.to_string(),
                location: MEMINFO_PATH.to_string(),
                reason: format!("invalid value: {}", raw),
            })?;
            fields.insert(key, value);
        }

        let field = |name: &str| {
            fields
                .get(name)
                .copied()
                .ok_or_else(|| SensorError::MissingField {
                    field: name.to_string(),
                    location: MEMINFO_PATH.to_string(),
                })
        };

        // Kernels before 3.14 have no MemAvailable.
        let available_kb = match field("MemAvailable") {
            Ok(v) => v,
            Err(_) => field("MemFree")? + field("Buffers")? + field("Cached")?,
        };

        Ok(MemoryStats {
            total_kb: field("MemTotal")?,
            available_kb,
            swap_free_kb: field("SwapFree")?,
        })
    }
}

/// Formats kB as whole mebibytes with the `M` suffix the scheduler accepts for
/// memory complexes.
pub fn format_mebibytes(kb: u64) -> String {
    format!("{}M", kb / 1024)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryField {
    Free,
    Total,
    SwapFree,
}

#[derive(Debug, Clone, Copy)]
pub struct MemoryProbe {
    field: MemoryField,
}

impl MemoryProbe {
    pub fn new(field: MemoryField) -> Self {
        Self { field }
    }

    fn select(&self, stats: &MemoryStats) -> u64 {
        match self.field {
            MemoryField::Free => stats.available_kb,
            MemoryField::Total => stats.total_kb,
            MemoryField::SwapFree => stats.swap_free_kb,
        }
    }
}

#[async_trait::async_trait]
impl Probe for MemoryProbe {
    async fn measure(&self) -> SensorResult<String> {
        let stats = MemoryStats::read().await?;
        Ok(format_mebibytes(self.select(&stats)))
    }
}

register_probe!("mem_free", MemoryProbe::new(MemoryField::Free));
register_probe!("mem_total", MemoryProbe::new(MemoryField::Total));
register_probe!("swap_free", MemoryProbe::new(MemoryField::SwapFree));

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:       16318480 kB
MemFree:         1207444 kB
MemAvailable:    9876544 kB
Buffers:          612340 kB
Cached:          7402308 kB
SwapTotal:       2097148 kB
SwapFree:        2097148 kB
HugePages_Total:       0
";

    #[test]
    fn parses_meminfo() {
        let stats = MemoryStats::parse(MEMINFO).unwrap();
        assert_eq!(stats.total_kb, 16318480);
        assert_eq!(stats.available_kb, 9876544);
        assert_eq!(stats.swap_free_kb, 2097148);
    }

    #[test]
    fn falls_back_without_mem_available() {
        let old_kernel: String = MEMINFO
            .lines()
            .filter(|l| !l.starts_with("MemAvailable"))
            .map(|l| format!("{l}\n"))
            .collect();
        let stats = MemoryStats::parse(&old_kernel).unwrap();
        assert_eq!(stats.available_kb, 1207444 + 612340 + 7402308);
    }

    #[test]
    fn missing_total_is_reported() {
        let err = MemoryStats::parse("MemAvailable: 10 kB\nSwapFree: 0 kB\n").unwrap_err();
        assert!(matches!(err, SensorError::MissingField { ref field, .. } if field == "MemTotal"));
    }

    #[test]
    fn garbage_value_is_parse_error() {
        let err = MemoryStats::parse("MemTotal: lots kB\n").unwrap_err();
        assert!(matches!(err, SensorError::ParseError { .. }));
    }

    #[test]
    fn probe_selects_and_formats_field() {
        let stats = MemoryStats::parse(MEMINFO).unwrap();
        let probe = MemoryProbe::new(MemoryField::Total);
        assert_eq!(format_mebibytes(probe.select(&stats)), "15936M");
        assert_eq!(format_mebibytes(2048), "2M");
        assert_eq!(format_mebibytes(1023), "0M");
    }
}
