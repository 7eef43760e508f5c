use std::{collections::HashMap, sync::Arc};

use once_cell::sync::Lazy;

use super::{error::SensorError, traits::Probe, types::SensorResult};

/// Metadata for one built-in probe, submitted to the global inventory.
/// Each entry provides a name and a factory creating the probe instance.
pub struct ProbeMeta {
    pub name: &'static str,
    pub factory: fn() -> Arc<dyn Probe>,
}

inventory::collect!(ProbeMeta);

/// Holds every registered probe, keyed by name.
pub struct ProbeRegistry {
    probes: HashMap<&'static str, Arc<dyn Probe>>,
}

impl ProbeRegistry {
    /// Builds a registry from all `ProbeMeta` entries submitted via `register_probe!`.
    pub fn new() -> Self {
        let mut probes = HashMap::new();

        for meta in inventory::iter::<ProbeMeta> {
            probes.insert(meta.name, (meta.factory)());
        }

        ProbeRegistry { probes }
    }

    /// Retrieves a probe by name.
    pub fn get(&self, name: &str) -> SensorResult<Arc<dyn Probe>> {
        self.probes
            .get(name)
            .cloned()
            .ok_or_else(|| SensorError::ProbeNotFound(name.to_string()))
    }

    /// Registered probe names, sorted.
    pub fn list_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.probes.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.probes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// The lazily built process-wide registry.
    pub fn global() -> &'static ProbeRegistry {
        &GLOBAL_REGISTRY
    }
}

impl Default for ProbeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: Lazy<ProbeRegistry> = Lazy::new(ProbeRegistry::new);

/// Facade over the global registry.
pub struct Probes;

impl Probes {
    pub fn get(name: &str) -> SensorResult<Arc<dyn Probe>> {
        ProbeRegistry::global().get(name)
    }

    pub fn list() -> Vec<&'static str> {
        ProbeRegistry::global().list_names()
    }

    pub fn exists(name: &str) -> bool {
        ProbeRegistry::global().contains(name)
    }
}

/// Registers a probe with the global inventory at compile time.
///
/// ```ignore
/// register_probe!("load_short", LoadAverageProbe::new(LoadWindow::OneMinute));
/// ```
#[macro_export]
macro_rules! register_probe {
    ($name:expr, $probe:expr) => {
        inventory::submit! {
            $crate::core::sensors::registry::ProbeMeta {
                name: $name,
                factory: || std::sync::Arc::new($probe),
            }
        }
    };
}
