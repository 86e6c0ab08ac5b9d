//! In-memory key-value backend.

use std::collections::BTreeMap;
use std::sync::RwLock;

use gridstate_core::{StoreError, StoreResult};

use super::traits::{KeyValueStore, KvWrite, StatsCounters, StoreStats};

/// Process-local backend. A batch is applied under a single write lock.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<String, String>>,
    stats: StatsCounters,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every key.
    pub fn clear(&self) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .clear();
        Ok(())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        let value = entries.get(key).cloned();
        self.stats.record_read(value.is_some());
        Ok(value)
    }

    fn write_batch(&self, writes: Vec<KvWrite>) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        for write in writes {
            match write {
                KvWrite::Put { key, value } => {
                    entries.insert(key, value);
                }
                KvWrite::Remove { key } => {
                    entries.remove(&key);
                }
            }
        }
        self.stats.record_batch();
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn stats(&self) -> StoreStats {
        self.stats.snapshot(self.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get_item("a").expect("get"), None);

        store.set_item("a", "1").expect("set");
        assert_eq!(store.get_item("a").expect("get"), Some("1".to_string()));

        store.remove_item("a").expect("remove");
        assert_eq!(store.get_item("a").expect("get"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_batch_applies_all_writes() {
        let store = MemoryKvStore::new();
        store.set_item("gone", "x").expect("set");
        store
            .write_batch(vec![
                KvWrite::put("p:a", "1"),
                KvWrite::put("p:b", "2"),
                KvWrite::remove("gone"),
            ])
            .expect("batch");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_item("gone").expect("get"), None);
    }

    #[test]
    fn test_keys_with_prefix() {
        let store = MemoryKvStore::new();
        for key in ["p:a:views", "p:a:default", "p:ab:views", "q:a:views"] {
            store.set_item(key, "v").expect("set");
        }
        assert_eq!(
            store.keys_with_prefix("p:a:").expect("scan"),
            vec!["p:a:default".to_string(), "p:a:views".to_string()]
        );
    }

    #[test]
    fn test_stats() {
        let store = MemoryKvStore::new();
        let _ = store.get_item("missing");
        store.set_item("k", "v").expect("set");
        let _ = store.get_item("k");
        let _ = store.get_item("k");

        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.entry_count, 1);
    }
}
