//! Host identity lookups.
//!
//! Grid Engine may know a machine under a different name than the one the OS
//! reports (multiple interfaces, aliases), so the scheduler's own `gethostname`
//! utility is the preferred source. The OS hostname is available as a fallback
//! and for setups without an `SGE_ROOT`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::{process::Command, sync::OnceCell};
use tracing::debug;

use super::{error::SensorError, traits::Probe, types::SensorResult};
use crate::register_probe;

/// Environment variable pointing at the Grid Engine installation.
pub const SGE_ROOT: &str = "SGE_ROOT";

const OS_HOSTNAME_PATH: &str = "/proc/sys/kernel/hostname";

/// Where a sensor takes its host name from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HostSource {
    /// Kernel hostname.
    #[default]
    Os,
    /// `$SGE_ROOT/utilbin/<arch>/gethostname -name`.
    Grid,
    /// A fixed name.
    Static(String),
}

impl HostSource {
    pub async fn resolve(&self) -> SensorResult<String> {
        match self {
            HostSource::Os => os_hostname().await,
            HostSource::Grid => GridEngine::global().local_hostname().await,
            HostSource::Static(name) => Ok(name.clone()),
        }
    }
}

/// Reads the kernel hostname.
pub async fn os_hostname() -> SensorResult<String> {
    let content = tokio::fs::read_to_string(OS_HOSTNAME_PATH)
        .await
        .map_err(|source| SensorError::FileRead {
            path: OS_HOSTNAME_PATH.to_string(),
            source,
        })?;

    let name = content.trim();
    if name.is_empty() {
        return Err(SensorError::InvalidFormat {
            location: OS_HOSTNAME_PATH.to_string(),
            reason: "hostname is empty".to_string(),
        });
    }
    Ok(name.to_string())
}

/// Reports the kernel hostname as a measurement value, e.g. for a string
/// complex that records which name the OS uses for an execution host.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostnameProbe;

#[async_trait::async_trait]
impl Probe for HostnameProbe {
    async fn measure(&self) -> SensorResult<String> {
        os_hostname().await
    }
}

register_probe!("hostname", HostnameProbe);

/// Access to the utilities shipped with a Grid Engine installation.
#[derive(Debug)]
pub struct GridEngine {
    root: Option<PathBuf>,
    arch: OnceCell<String>,
}

static GLOBAL_GRID: once_cell::sync::Lazy<GridEngine> =
    once_cell::sync::Lazy::new(GridEngine::from_env);

impl GridEngine {
    /// Uses the given installation root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            arch: OnceCell::new(),
        }
    }

    /// Uses `$SGE_ROOT`; lookups fail if it is unset.
    pub fn from_env() -> Self {
        Self {
            root: std::env::var_os(SGE_ROOT).map(PathBuf::from),
            arch: OnceCell::new(),
        }
    }

    /// Process-wide instance rooted at `$SGE_ROOT`, sharing one cached architecture.
    pub fn global() -> &'static GridEngine {
        &GLOBAL_GRID
    }

    fn root(&self) -> SensorResult<&Path> {
        self.root.as_deref().ok_or_else(|| SensorError::EnvVar {
            name: SGE_ROOT.to_string(),
            source: std::env::VarError::NotPresent,
        })
    }

    /// Architecture string from `$SGE_ROOT/util/arch`, needed to locate the
    /// platform binaries. Computed once; the architecture cannot change while
    /// the sensor runs. Failures are not cached.
    pub async fn arch(&self) -> SensorResult<&str> {
        let arch = self
            .arch
            .get_or_try_init(|| async {
                let script = self.root()?.join("util").join("arch");
                let arch = run_trimmed(&script, &[]).await?;
                debug!("Detected Grid Engine architecture: {}", arch);
                Ok::<_, SensorError>(arch)
            })
            .await?;
        Ok(arch.as_str())
    }

    /// Host name as resolved by Grid Engine itself.
    pub async fn local_hostname(&self) -> SensorResult<String> {
        let arch = self.arch().await?;
        let binary = self
            .root()?
            .join("utilbin")
            .join(arch)
            .join("gethostname");
        run_trimmed(&binary, &["-name"]).await
    }
}

/// Runs a command and returns its trimmed stdout.
async fn run_trimmed(program: &Path, args: &[&str]) -> SensorResult<String> {
    let command = program.display().to_string();
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|source| SensorError::CommandExecution {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(SensorError::CommandFailed {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_host_is_returned_verbatim() {
        let source = HostSource::Static("node01.cluster".into());
        assert_eq!(source.resolve().await.unwrap(), "node01.cluster");
    }

    #[tokio::test]
    async fn grid_lookup_without_root_fails() {
        let grid = GridEngine {
            root: None,
            arch: OnceCell::new(),
        };
        let err = grid.local_hostname().await.unwrap_err();
        assert!(matches!(err, SensorError::EnvVar { ref name, .. } if name == SGE_ROOT));
        assert_eq!(
            crate::core::engine::error_chain(&err),
            "Cannot use $SGE_ROOT: environment variable not found"
        );
    }

    #[tokio::test]
    async fn grid_lookup_with_missing_install_fails_to_spawn() {
        let grid = GridEngine::new("/nonexistent/sge-root");
        let err = grid.arch().await.unwrap_err();
        match err {
            SensorError::CommandExecution { command, .. } => {
                assert_eq!(command, "/nonexistent/sge-root/util/arch");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn arch_failure_is_retried_not_cached() {
        let grid = GridEngine::new("/nonexistent/sge-root");
        assert!(grid.arch().await.is_err());
        assert!(grid.arch().await.is_err());
        assert!(grid.arch.get().is_none());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn os_hostname_is_not_empty() {
        let name = os_hostname().await.unwrap();
        assert!(!name.is_empty());
        assert!(!name.contains('\n'));
    }

    #[test]
    fn host_source_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            host: HostSource,
        }

        let w: Wrapper = toml::from_str(r#"host = "grid""#).unwrap();
        assert_eq!(w.host, HostSource::Grid);

        let w: Wrapper = toml::from_str(r#"host = { static = "n1" }"#).unwrap();
        assert_eq!(w.host, HostSource::Static("n1".into()));
    }
}
