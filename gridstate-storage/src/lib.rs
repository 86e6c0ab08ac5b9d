//! gridstate storage - persistence provider for saved views
//!
//! Defines the [`ViewStore`] abstraction and its local implementation over a
//! key-value backend (LMDB on disk, or memory), plus the selection function
//! that picks one from configuration.

pub mod backend;
pub mod local;
pub mod provider;
pub mod select;

pub use backend::{
    KeyValueStore, KvWrite, LmdbKvStore, LmdbStoreError, MemoryKvStore, RecordKind, ScopedKey,
    StoreStats, DEFAULT_KEY_PREFIX,
};
pub use local::LocalViewStore;
pub use provider::ViewStore;
pub use select::select_store;
