#![allow(dead_code)]

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use objcache::backend::{BackendError, CacheBackend, InProcessBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get { group: String, key: String },
    Set { group: String, key: String },
    Delete { group: String, key: String },
    Flush,
}

/// In-process backend that records every call and can be switched to fail.
pub struct RecordingBackend {
    inner: InProcessBackend,
    calls: Mutex<Vec<Call>>,
    failing: AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            inner: InProcessBackend::new(NonZeroUsize::new(64).expect("capacity")),
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let backend = Self::new();
        backend.set_failing(true);
        backend
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn flushes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Flush))
            .count()
    }

    pub fn sets_in(&self, group: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Set { group: g, .. } if g == group))
            .count()
    }

    pub fn gets_in(&self, group: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Get { group: g, .. } if g == group))
            .count()
    }

    fn record(&self, call: Call) -> Result<(), BackendError> {
        self.calls.lock().expect("calls lock").push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::io("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn get(&self, group: &str, key: &str) -> Result<Option<Bytes>, BackendError> {
        self.record(Call::Get {
            group: group.to_string(),
            key: key.to_string(),
        })?;
        self.inner.get(group, key).await
    }

    async fn set(
        &self,
        group: &str,
        key: &str,
        value: Bytes,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        self.record(Call::Set {
            group: group.to_string(),
            key: key.to_string(),
        })?;
        self.inner.set(group, key, value, ttl).await
    }

    async fn delete(&self, group: &str, key: &str) -> Result<(), BackendError> {
        self.record(Call::Delete {
            group: group.to_string(),
            key: key.to_string(),
        })?;
        self.inner.delete(group, key).await
    }

    async fn flush(&self) -> Result<(), BackendError> {
        self.record(Call::Flush)?;
        self.inner.flush().await
    }

    async fn increment(&self, group: &str, key: &str, amount: u64) -> Result<u64, BackendError> {
        self.inner.increment(group, key, amount).await
    }

    async fn decrement(&self, group: &str, key: &str, amount: u64) -> Result<u64, BackendError> {
        self.inner.decrement(group, key, amount).await
    }
}
