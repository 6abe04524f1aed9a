//! Operation counters for the ordered store (`metrics` feature).
//!
//! Counters are relaxed atomics: they are observational and never used to
//! make decisions, so a snapshot taken during concurrent updates may mix
//! values from slightly different instants.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of store-level metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    /// Successful add-if-absent calls.
    pub inserts: u64,
    /// Add-if-absent calls that found the key already present.
    pub duplicates: u64,
    /// Entries removed by `remove`, `take` or `poll_*`.
    pub removes: u64,
    /// Entries removed to enforce `max_capacity`.
    pub evictions: u64,
    /// Segment table doublings.
    pub resizes: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StoreCounters {
    inserts: AtomicU64,
    duplicates: AtomicU64,
    removes: AtomicU64,
    evictions: AtomicU64,
    resizes: AtomicU64,
}

impl StoreCounters {
    pub(crate) fn snapshot(&self) -> StoreMetrics {
        StoreMetrics {
            inserts: self.inserts.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            resizes: self.resizes.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn inc_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_resize(&self) {
        self.resizes.fetch_add(1, Ordering::Relaxed);
    }
}
