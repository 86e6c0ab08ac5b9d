//! Persistence provider trait for saved views.
//!
//! Every operation is partitioned by [`ScopeKey`]. The trait is async and
//! fallible even though the shipped local store completes synchronously: a
//! network-backed provider must be a drop-in replacement, so callers may not
//! assume a call has finished before they await it.

use async_trait::async_trait;
use gridstate_core::{NewSavedView, SavedView, SavedViewPatch, ScopeKey, StoreResult, ViewId};

use crate::backend::StoreStats;

/// CRUD over saved views and the per-scope default pointer.
///
/// Implementations must keep scopes fully isolated and must clear the default
/// pointer in the same logical operation that deletes the view it references.
#[async_trait]
pub trait ViewStore: Send + Sync {
    /// All saved views of a scope, in creation order.
    ///
    /// Read failures are logged and reported as an empty list.
    async fn list(&self, scope: &ScopeKey) -> Vec<SavedView>;

    /// Store a new view under a fresh id and return that id.
    async fn save(&self, scope: &ScopeKey, view: NewSavedView) -> StoreResult<ViewId>;

    /// Merge `patch` into an existing view. Unknown ids are a no-op.
    async fn update(&self, scope: &ScopeKey, id: ViewId, patch: SavedViewPatch)
        -> StoreResult<()>;

    /// Remove a view, clearing the default pointer if it referenced it.
    async fn delete(&self, scope: &ScopeKey, id: ViewId) -> StoreResult<()>;

    async fn get_default_id(&self, scope: &ScopeKey) -> StoreResult<Option<ViewId>>;

    async fn set_default_id(&self, scope: &ScopeKey, id: Option<ViewId>) -> StoreResult<()>;

    async fn get(&self, scope: &ScopeKey, id: ViewId) -> StoreResult<Option<SavedView>>;

    /// Drop every record of a scope. Returns the number of records removed.
    async fn clear_scope(&self, scope: &ScopeKey) -> StoreResult<u64>;

    /// Rename a view. Unknown ids are a no-op.
    async fn rename(&self, scope: &ScopeKey, id: ViewId, name: String) -> StoreResult<()> {
        self.update(scope, id, SavedViewPatch::rename(name)).await
    }

    /// Usage counters of the underlying backend, if it keeps any.
    fn stats(&self) -> Option<StoreStats> {
        None
    }
}
