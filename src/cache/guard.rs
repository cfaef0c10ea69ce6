//! Per-request flush latches.

use std::collections::BTreeMap;

use super::events::EventClass;

/// One-way latch per event class, owned by a single request.
///
/// A fresh guard is created for every request and dropped with it; nothing
/// here is shared across requests.
#[derive(Debug, Clone, Default)]
pub struct FlushGuard {
    latches: BTreeMap<EventClass, bool>,
}

impl FlushGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant the first flush for `class` in this request and deny every
    /// later one. Performs no cache I/O.
    pub fn should_flush(&mut self, class: EventClass) -> bool {
        let latch = self.latches.entry(class).or_insert(false);
        if *latch {
            return false;
        }
        *latch = true;
        true
    }

    pub fn is_latched(&self, class: EventClass) -> bool {
        self.latches.get(&class).copied().unwrap_or(false)
    }

    /// Classes that have already been granted a flush, in class order.
    pub fn latched(&self) -> Vec<EventClass> {
        self.latches
            .iter()
            .filter(|(_, latched)| **latched)
            .map(|(class, _)| *class)
            .collect()
    }
}
