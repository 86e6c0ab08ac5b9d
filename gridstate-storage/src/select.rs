//! Provider selection.
//!
//! The single place that decides which [`ViewStore`] implementation a process
//! uses. Callers receive an `Arc<dyn ViewStore>` and never name a concrete
//! backend, so a remote provider can be added here without touching them.

use std::sync::Arc;

use gridstate_core::{StoreBackend, StoreConfig, StoreError, StoreResult};

use crate::backend::{LmdbKvStore, MemoryKvStore};
use crate::local::LocalViewStore;
use crate::provider::ViewStore;

/// Build the configured provider.
pub fn select_store(config: &StoreConfig) -> StoreResult<Arc<dyn ViewStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::debug!(prefix = %config.key_prefix, "Using in-memory view store");
            Ok(Arc::new(LocalViewStore::with_prefix(
                MemoryKvStore::new(),
                config.key_prefix.clone(),
            )))
        }
        StoreBackend::Lmdb => {
            let path = config.path.as_ref().ok_or_else(|| StoreError::Unavailable {
                reason: "lmdb backend requires store.path".to_string(),
            })?;
            let kv = LmdbKvStore::open(path, config.max_size_mb)?;
            Ok(Arc::new(LocalViewStore::with_prefix(
                kv,
                config.key_prefix.clone(),
            )))
        }
    }
}
