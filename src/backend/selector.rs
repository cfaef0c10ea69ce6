use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::BackendSettings;

use super::{BackendError, CacheBackend, InProcessBackend, NullBackend};

/// One candidate in the backend priority list.
///
/// `probe` returns `Ok(None)` when the capability is simply absent in this
/// environment and `Err` when it is present but could not be brought up.
/// Both outcomes move selection on to the next candidate.
pub trait BackendProbe: Send + Sync {
    fn name(&self) -> &'static str;

    fn probe(&self) -> Result<Option<Arc<dyn CacheBackend>>, BackendError>;
}

/// Probe for the bounded in-process LRU store.
#[derive(Debug, Clone)]
pub struct InProcessProbe {
    enabled: bool,
    capacity: NonZeroUsize,
    default_ttl: Option<Duration>,
}

impl InProcessProbe {
    pub fn new(enabled: bool, capacity: NonZeroUsize, default_ttl: Option<Duration>) -> Self {
        Self {
            enabled,
            capacity,
            default_ttl,
        }
    }
}

impl From<&BackendSettings> for InProcessProbe {
    fn from(settings: &BackendSettings) -> Self {
        Self::new(
            settings.enabled,
            settings.memory_capacity,
            settings.default_ttl,
        )
    }
}

impl BackendProbe for InProcessProbe {
    fn name(&self) -> &'static str {
        "in-process"
    }

    fn probe(&self) -> Result<Option<Arc<dyn CacheBackend>>, BackendError> {
        if !self.enabled {
            return Ok(None);
        }
        let backend = InProcessBackend::new(self.capacity).with_default_ttl(self.default_ttl);
        Ok(Some(Arc::new(backend)))
    }
}

/// Priority-ordered backend selection, evaluated once at startup.
#[derive(Default)]
pub struct BackendSelector {
    probes: Vec<Box<dyn BackendProbe>>,
}

impl BackendSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in candidate list for the given settings.
    pub fn from_settings(settings: &BackendSettings) -> Self {
        Self::new().with_probe(InProcessProbe::from(settings))
    }

    /// Append a candidate at the lowest priority so far.
    pub fn with_probe(mut self, probe: impl BackendProbe + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    /// Insert a candidate ahead of every existing one.
    pub fn with_preferred_probe(mut self, probe: impl BackendProbe + 'static) -> Self {
        self.probes.insert(0, Box::new(probe));
        self
    }

    pub fn candidates(&self) -> Vec<&'static str> {
        self.probes.iter().map(|probe| probe.name()).collect()
    }

    /// Walk the candidates in order; the first one that comes up wins.
    pub fn select(&self) -> Arc<dyn CacheBackend> {
        for probe in &self.probes {
            match probe.probe() {
                Ok(Some(backend)) => {
                    info!(
                        probe = probe.name(),
                        backend = backend.name(),
                        "Cache backend selected"
                    );
                    return backend;
                }
                Ok(None) => {
                    debug!(probe = probe.name(), "Cache backend capability absent");
                }
                Err(err) => {
                    warn!(
                        probe = probe.name(),
                        error = %err,
                        "Cache backend probe failed, trying next candidate"
                    );
                }
            }
        }

        warn!(
            candidates = ?self.candidates(),
            "No capable cache backend, falling back to null backend"
        );
        Arc::new(NullBackend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Absent;

    impl BackendProbe for Absent {
        fn name(&self) -> &'static str {
            "absent"
        }

        fn probe(&self) -> Result<Option<Arc<dyn CacheBackend>>, BackendError> {
            Ok(None)
        }
    }

    struct Broken;

    impl BackendProbe for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn probe(&self) -> Result<Option<Arc<dyn CacheBackend>>, BackendError> {
            Err(BackendError::unavailable("broken", "connection refused"))
        }
    }

    fn capacity() -> NonZeroUsize {
        NonZeroUsize::new(16).expect("non-zero")
    }

    #[test]
    fn first_capable_probe_wins() {
        let selector = BackendSelector::new()
            .with_probe(Absent)
            .with_probe(Broken)
            .with_probe(InProcessProbe::new(true, capacity(), None));

        assert_eq!(selector.select().name(), "in-process");
    }

    #[test]
    fn falls_back_to_null_backend() {
        let selector = BackendSelector::new()
            .with_probe(Absent)
            .with_probe(Broken)
            .with_probe(InProcessProbe::new(false, capacity(), None));

        assert_eq!(selector.select().name(), "null");
    }

    #[test]
    fn empty_selector_yields_null_backend() {
        assert_eq!(BackendSelector::new().select().name(), "null");
    }

    #[test]
    fn preferred_probe_is_consulted_first() {
        let selector = BackendSelector::new()
            .with_probe(Absent)
            .with_preferred_probe(Broken);

        assert_eq!(selector.candidates(), vec!["broken", "absent"]);
    }
}
