//! Key-value backends with scope-partitioned keys.
//!
//! The saved-view store persists two records per scope (the ordered list of
//! views and the default pointer) in a plain key-value backend. Two backends
//! are provided:
//!
//! - [`LmdbKvStore`] - durable, on-disk, one write transaction per batch
//! - [`MemoryKvStore`] - process-local, for tests and ephemeral sessions
//!
//! # Scope Isolation
//!
//! Keys are always built through [`ScopedKey`], which requires a
//! [`ScopeKey`](gridstate_core::ScopeKey). Isolation between scopes is a
//! property of the key namespace, not of any lock.

pub mod lmdb_backend;
pub mod memory;
pub mod scoped_key;
pub mod traits;

pub use lmdb_backend::{LmdbKvStore, LmdbStoreError};
pub use memory::MemoryKvStore;
pub use scoped_key::{RecordKind, ScopedKey, DEFAULT_KEY_PREFIX};
pub use traits::{KeyValueStore, KvWrite, StoreStats};
