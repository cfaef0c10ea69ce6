//! Poison-tolerant access to backend state.
//!
//! A panic while a guard is held must not take the backend down for every
//! later request, so poisoned locks are taken over and reported.

use std::sync::{LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

fn recover<G>(
    result: LockResult<G>,
    backend: &'static str,
    access: &'static str,
    op: &'static str,
) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            backend,
            access, op, "Backend lock poisoned; continuing with possibly stale entries"
        );
        poisoned.into_inner()
    })
}

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    backend: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), backend, "read", op)
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    backend: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), backend, "write", op)
}
