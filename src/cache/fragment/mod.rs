//! Rendered-fragment caches for navigation menus and widgets.
//!
//! Both families share [`FragmentStore`]: backend errors are logged and
//! counted, then treated as a miss (on read) or ignored (on write), so a
//! failing backend only ever costs a live render.

mod keys;
mod nav_menu;
mod provenance;
mod widget;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use metrics::counter;
use tracing::{debug, warn};

use crate::backend::CacheBackend;

pub use keys::{FragmentGroup, FragmentKey};
pub use nav_menu::{MenuRenderer, NavMenuCache, strip_current_classes};
pub use provenance::{Clock, FragmentRecord, Provenance, system_clock};
pub use widget::{
    EXCLUDE_FLAG, WidgetCache, WidgetRenderer, apply_exclusion_flag, exclusion_checkbox,
};

const METRIC_FRAGMENT_HIT_TOTAL: &str = "objcache_fragment_hit_total";
const METRIC_FRAGMENT_MISS_TOTAL: &str = "objcache_fragment_miss_total";
pub(crate) const METRIC_FRAGMENT_BYPASS_TOTAL: &str = "objcache_fragment_bypass_total";
const METRIC_BACKEND_ERROR_TOTAL: &str = "objcache_backend_error_total";

/// Backend access shared by the fragment families.
#[derive(Clone)]
pub struct FragmentStore {
    backend: Arc<dyn CacheBackend>,
    ttl: Option<Duration>,
    clock: Clock,
}

impl FragmentStore {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Option<Duration>) -> Self {
        Self {
            backend,
            ttl,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Provenance stamped with the store's clock.
    pub fn provenance(&self, name: impl Into<String>, group: FragmentGroup) -> Provenance {
        Provenance::new(name, group.as_str(), (self.clock)())
    }

    /// Stored markup for `key`. Errors and undecodable values count as misses.
    pub async fn fetch(&self, key: &FragmentKey) -> Option<String> {
        let group = key.group().as_str();
        let stored = match self.backend.get(group, key.key()).await {
            Ok(stored) => stored,
            Err(err) => {
                counter!(METRIC_BACKEND_ERROR_TOTAL, "op" => "get").increment(1);
                warn!(
                    group,
                    backend = self.backend.name(),
                    error = %err,
                    "Fragment lookup failed; rendering live"
                );
                None
            }
        };

        let markup = stored.and_then(|bytes| match String::from_utf8(bytes.to_vec()) {
            Ok(markup) => Some(markup),
            Err(_) => {
                warn!(group, "Stored fragment is not valid UTF-8; ignoring");
                None
            }
        });

        if markup.is_some() {
            counter!(METRIC_FRAGMENT_HIT_TOTAL, "group" => group).increment(1);
            debug!(group, outcome = "hit", "Fragment cache");
        } else {
            counter!(METRIC_FRAGMENT_MISS_TOTAL, "group" => group).increment(1);
            debug!(group, outcome = "miss", "Fragment cache");
        }
        markup
    }

    /// Best-effort write; failures are logged and swallowed.
    pub async fn store(&self, key: &FragmentKey, markup: &str) {
        let group = key.group().as_str();
        let value = Bytes::copy_from_slice(markup.as_bytes());
        if let Err(err) = self.backend.set(group, key.key(), value, self.ttl).await {
            counter!(METRIC_BACKEND_ERROR_TOTAL, "op" => "set").increment(1);
            warn!(
                group,
                backend = self.backend.name(),
                error = %err,
                "Fragment store failed"
            );
        }
    }
}
