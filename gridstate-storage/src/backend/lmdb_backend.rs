//! LMDB-backed key-value store.
//!
//! Uses the heed crate (Rust bindings for LMDB) as the durable local store
//! for saved views.
//!
//! # Atomicity
//!
//! Every [`KeyValueStore::write_batch`] runs in a single write transaction,
//! so deleting a view and clearing the default pointer that referenced it
//! either both land or neither does.

use std::path::Path;

use gridstate_core::{StoreError, StoreResult};
use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};

use super::traits::{KeyValueStore, KvWrite, StatsCounters, StoreStats};

/// Error type for LMDB operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for StoreError {
    fn from(e: LmdbStoreError) -> Self {
        match e {
            LmdbStoreError::Transaction(reason) => StoreError::Transaction { reason },
            other => StoreError::Unavailable {
                reason: other.to_string(),
            },
        }
    }
}

fn txn_error(e: heed::Error) -> StoreError {
    LmdbStoreError::Transaction(e.to_string()).into()
}

/// LMDB environment holding one unnamed database of string keys and values.
///
/// # Example
///
/// ```ignore
/// use gridstate_storage::{LmdbKvStore, LocalViewStore};
///
/// let kv = LmdbKvStore::open("/var/lib/gridstate", 64)?;
/// let store = LocalViewStore::new(kv);
/// ```
pub struct LmdbKvStore {
    env: Env,
    db: Database<Str, Str>,
    stats: StatsCounters,
}

impl LmdbKvStore {
    /// Open (creating if needed) an environment in `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        let map_size = max_size_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            LmdbStoreError::EnvOpen(format!("map size of {max_size_mb} MB overflows"))
        })?;

        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per path by this process;
        // callers must not open the same directory twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Str, Str> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        tracing::debug!(path = %path.as_ref().display(), max_size_mb, "Opened LMDB view store");

        Ok(Self {
            env,
            db,
            stats: StatsCounters::default(),
        })
    }

    fn entry_count(&self) -> u64 {
        self.env
            .read_txn()
            .ok()
            .and_then(|rtxn| self.db.len(&rtxn).ok())
            .unwrap_or(0)
    }
}

impl KeyValueStore for LmdbKvStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        let value = self
            .db
            .get(&rtxn, key)
            .map_err(txn_error)?
            .map(str::to_string);
        self.stats.record_read(value.is_some());
        Ok(value)
    }

    fn write_batch(&self, writes: Vec<KvWrite>) -> StoreResult<()> {
        let mut wtxn = self.env.write_txn().map_err(txn_error)?;

        for write in &writes {
            match write {
                KvWrite::Put { key, value } => {
                    self.db.put(&mut wtxn, key, value).map_err(txn_error)?;
                }
                KvWrite::Remove { key } => {
                    self.db.delete(&mut wtxn, key).map_err(txn_error)?;
                }
            }
        }

        wtxn.commit().map_err(txn_error)?;
        self.stats.record_batch();
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        let iter = self.db.prefix_iter(&rtxn, prefix).map_err(txn_error)?;

        let mut keys = Vec::new();
        for result in iter {
            match result {
                Ok((key, _)) => keys.push(key.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, prefix, "Skipping unreadable LMDB entry");
                }
            }
        }
        Ok(keys)
    }

    fn stats(&self) -> StoreStats {
        self.stats.snapshot(self.entry_count())
    }
}
