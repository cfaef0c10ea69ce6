use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::{BackendError, CacheBackend};

/// Backend used when no capable store could be selected.
///
/// Every read misses and every write is accepted and discarded, so callers
/// never need to special-case a missing cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

#[async_trait]
impl CacheBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn get(&self, _group: &str, _key: &str) -> Result<Option<Bytes>, BackendError> {
        Ok(None)
    }

    async fn set(
        &self,
        _group: &str,
        _key: &str,
        _value: Bytes,
        _ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        Ok(())
    }

    async fn delete(&self, _group: &str, _key: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn flush(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn increment(&self, group: &str, key: &str, _amount: u64) -> Result<u64, BackendError> {
        Err(BackendError::missing(group, key))
    }

    async fn decrement(&self, group: &str, key: &str, _amount: u64) -> Result<u64, BackendError> {
        Err(BackendError::missing(group, key))
    }
}
