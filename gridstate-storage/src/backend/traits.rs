//! Key-value backend trait and statistics.
//!
//! This is the "local storage" contract the saved-view store is built on:
//! string keys, string values, and a batch write that is applied atomically.

use gridstate_core::StoreResult;
use std::sync::atomic::{AtomicU64, Ordering};

/// One write of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvWrite {
    Put { key: String, value: String },
    Remove { key: String },
}

impl KvWrite {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        KvWrite::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        KvWrite::Remove { key: key.into() }
    }
}

/// Synchronous key-value backend.
///
/// Implementations must be thread-safe. `write_batch` must apply all writes
/// or none of them.
pub trait KeyValueStore: Send + Sync {
    /// Read one value.
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Apply a group of writes atomically.
    fn write_batch(&self, writes: Vec<KvWrite>) -> StoreResult<()>;

    /// All keys starting with `prefix`, in key order.
    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Usage counters.
    fn stats(&self) -> StoreStats;

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.write_batch(vec![KvWrite::put(key, value)])
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.write_batch(vec![KvWrite::remove(key)])
    }
}

/// Statistics about backend usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Reads that found a value.
    pub hits: u64,
    /// Reads that found nothing.
    pub misses: u64,
    /// Committed batches.
    pub batches: u64,
    /// Number of keys currently stored.
    pub entry_count: u64,
}

impl StoreStats {
    /// Fraction of reads that found a value (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Lock-free counters shared by the backends.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    batches: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_read(&self, found: bool) {
        if found {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_batch(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entry_count: u64) -> StoreStats {
        StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            entry_count,
        }
    }
}
