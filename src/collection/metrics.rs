//! MOTORPOOL - Collection Metrics
//! Atomic counters tracking registry operations in a lock-free way.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Operation counters for a [`super::CollectionStore`].
///
/// All counters use `Ordering::Relaxed`; they are read for reporting
/// only and never synchronize anything.
#[derive(Debug)]
pub struct CollectionMetrics {
    /// Vehicles added.
    pub adds: AtomicU64,
    /// Vehicles updated.
    pub updates: AtomicU64,
    /// Vehicles removed, summed over all removal kinds.
    pub removals: AtomicU64,
    /// Reindex passes that actually renumbered something.
    pub reindexes: AtomicU64,
    /// Snapshots written to the backing store.
    pub saves: AtomicU64,
    /// Mutations refused by validation or the ownership guard.
    pub rejections: AtomicU64,
    started: Instant,
}

impl CollectionMetrics {
    pub fn new() -> Self {
        Self {
            adds: AtomicU64::new(0),
            updates: AtomicU64::new(0),
            removals: AtomicU64::new(0),
            reindexes: AtomicU64::new(0),
            saves: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_add(&self) {
        self.adds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removals(&self, count: usize) {
        self.removals.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_reindex(&self) {
        self.reindexes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save(&self) {
        self.saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Mutations applied (adds + updates + removals).
    pub fn total_mutations(&self) -> u64 {
        self.adds.load(Ordering::Relaxed)
            + self.updates.load(Ordering::Relaxed)
            + self.removals.load(Ordering::Relaxed)
    }

    /// Format metrics as a human-readable report.
    pub fn report(&self) -> String {
        format!(
            "Operations:\n\
             \x20 adds:       {}\n\
             \x20 updates:    {}\n\
             \x20 removals:   {}\n\
             \x20 reindexes:  {}\n\
             \x20 saves:      {}\n\
             \x20 rejected:   {}\n\
             Uptime: {:.2}s",
            self.adds.load(Ordering::Relaxed),
            self.updates.load(Ordering::Relaxed),
            self.removals.load(Ordering::Relaxed),
            self.reindexes.load(Ordering::Relaxed),
            self.saves.load(Ordering::Relaxed),
            self.rejections.load(Ordering::Relaxed),
            self.uptime_secs(),
        )
    }
}

impl Default for CollectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
