//! Key-value cache backends.
//!
//! The flush coordinator and fragment caches only talk to a backend through
//! [`CacheBackend`]. Concrete stores are chosen once at startup by the
//! [`BackendSelector`], which walks a priority list of probes and falls back
//! to [`NullBackend`] when none of them can serve.

mod lock;
mod memory;
mod null;
mod selector;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use time::OffsetDateTime;

pub use memory::InProcessBackend;
pub use null::NullBackend;
pub use selector::{BackendProbe, BackendSelector, InProcessProbe};

/// A stored value together with its namespace and the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub group: String,
    pub key: String,
    pub value: Bytes,
    pub provided_at: OffsetDateTime,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("cache backend `{backend}` is unavailable: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },
    #[error("no value stored for `{group}:{key}`")]
    Missing { group: String, key: String },
    #[error("value stored for `{group}:{key}` is not a counter")]
    NotNumeric { group: String, key: String },
    #[error("cache backend i/o failed: {0}")]
    Io(String),
}

impl BackendError {
    pub fn unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            backend,
            reason: reason.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    pub(crate) fn missing(group: &str, key: &str) -> Self {
        Self::Missing {
            group: group.to_string(),
            key: key.to_string(),
        }
    }

    pub(crate) fn not_numeric(group: &str, key: &str) -> Self {
        Self::NotNumeric {
            group: group.to_string(),
            key: key.to_string(),
        }
    }
}

/// Uniform namespaced key-value store.
///
/// Implementations must tolerate concurrent use from independent requests;
/// each single-key operation is expected to be atomic, cross-key transactions
/// are not required.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn get(&self, group: &str, key: &str) -> Result<Option<Bytes>, BackendError>;

    async fn set(
        &self,
        group: &str,
        key: &str,
        value: Bytes,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError>;

    async fn delete(&self, group: &str, key: &str) -> Result<(), BackendError>;

    /// Drop every entry in every group.
    async fn flush(&self) -> Result<(), BackendError>;

    async fn increment(&self, group: &str, key: &str, amount: u64) -> Result<u64, BackendError>;

    async fn decrement(&self, group: &str, key: &str, amount: u64) -> Result<u64, BackendError>;
}
