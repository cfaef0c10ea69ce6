use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use time::OffsetDateTime;

use super::lock::{rw_read, rw_write};
use super::{BackendError, CacheBackend, CacheEntry};

const SOURCE: &str = "memory";
const METRIC_EVICT_TOTAL: &str = "objcache_memory_evict_total";

struct Stored {
    value: Bytes,
    provided_at: OffsetDateTime,
    expires_at: Option<Instant>,
}

impl Stored {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Bounded in-process LRU store keyed by `(group, key)`.
///
/// Entries written with a TTL are dropped lazily on the first read after
/// their deadline.
pub struct InProcessBackend {
    entries: RwLock<LruCache<(String, String), Stored>>,
    default_ttl: Option<Duration>,
}

impl InProcessBackend {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            default_ttl: None,
        }
    }

    /// TTL applied to writes that do not carry their own.
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Inspect an entry without touching its recency.
    pub fn entry(&self, group: &str, key: &str) -> Option<CacheEntry> {
        let entries = rw_read(&self.entries, SOURCE, "entry");
        let stored = entries.peek(&(group.to_string(), key.to_string()))?;
        if stored.is_expired(Instant::now()) {
            return None;
        }
        Some(CacheEntry {
            group: group.to_string(),
            key: key.to_string(),
            value: stored.value.clone(),
            provided_at: stored.provided_at,
        })
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn adjust(
        &self,
        group: &str,
        key: &str,
        op: &'static str,
        apply: impl FnOnce(u64) -> u64,
    ) -> Result<u64, BackendError> {
        let mut entries = rw_write(&self.entries, SOURCE, op);
        let slot = (group.to_string(), key.to_string());
        let now = Instant::now();

        let expired = match entries.peek(&slot) {
            Some(stored) => stored.is_expired(now),
            None => return Err(BackendError::missing(group, key)),
        };
        if expired {
            entries.pop(&slot);
            return Err(BackendError::missing(group, key));
        }
        let Some(stored) = entries.get_mut(&slot) else {
            return Err(BackendError::missing(group, key));
        };

        let current = std::str::from_utf8(&stored.value)
            .ok()
            .and_then(|text| text.trim().parse::<u64>().ok())
            .ok_or_else(|| BackendError::not_numeric(group, key))?;

        let next = apply(current);
        stored.value = Bytes::from(next.to_string());
        stored.provided_at = OffsetDateTime::now_utc();
        Ok(next)
    }
}

#[async_trait]
impl CacheBackend for InProcessBackend {
    fn name(&self) -> &'static str {
        "in-process"
    }

    async fn get(&self, group: &str, key: &str) -> Result<Option<Bytes>, BackendError> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let slot = (group.to_string(), key.to_string());
        let expired = match entries.peek(&slot) {
            Some(stored) => stored.is_expired(Instant::now()),
            None => return Ok(None),
        };
        if expired {
            entries.pop(&slot);
            return Ok(None);
        }
        Ok(entries.get(&slot).map(|stored| stored.value.clone()))
    }

    async fn set(
        &self,
        group: &str,
        key: &str,
        value: Bytes,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        let expires_at = ttl
            .or(self.default_ttl)
            .and_then(|ttl| Instant::now().checked_add(ttl));
        let stored = Stored {
            value,
            provided_at: OffsetDateTime::now_utc(),
            expires_at,
        };
        let slot = (group.to_string(), key.to_string());
        let evicted = rw_write(&self.entries, SOURCE, "set").push(slot.clone(), stored);
        if evicted.is_some_and(|(evicted_slot, _)| evicted_slot != slot) {
            counter!(METRIC_EVICT_TOTAL).increment(1);
        }
        Ok(())
    }

    async fn delete(&self, group: &str, key: &str) -> Result<(), BackendError> {
        rw_write(&self.entries, SOURCE, "delete").pop(&(group.to_string(), key.to_string()));
        Ok(())
    }

    async fn flush(&self) -> Result<(), BackendError> {
        rw_write(&self.entries, SOURCE, "flush").clear();
        Ok(())
    }

    async fn increment(&self, group: &str, key: &str, amount: u64) -> Result<u64, BackendError> {
        self.adjust(group, key, "increment", |current| {
            current.saturating_add(amount)
        })
    }

    async fn decrement(&self, group: &str, key: &str, amount: u64) -> Result<u64, BackendError> {
        self.adjust(group, key, "decrement", |current| {
            current.saturating_sub(amount)
        })
    }
}
