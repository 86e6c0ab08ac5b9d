//! Saved-view store over a local key-value backend.
//!
//! # Record Layout
//!
//! Per scope, two records:
//!
//! - `{prefix}:{scope}:views` - JSON array of `{id, name, snapshot, timestamp}`
//! - `{prefix}:{scope}:default` - JSON string holding the default view id
//!
//! Entries of the views array that fail to parse are skipped on read and
//! dropped on the next write of that scope, so one corrupt entry never hides
//! the others.

use async_trait::async_trait;
use gridstate_core::{
    NewSavedView, SavedView, SavedViewPatch, ScopeKey, StoreError, StoreResult, ViewId,
};
use serde_json::Value;

use crate::backend::{
    KeyValueStore, KvWrite, RecordKind, ScopedKey, StoreStats, DEFAULT_KEY_PREFIX,
};
use crate::provider::ViewStore;

/// [`ViewStore`] backed by any [`KeyValueStore`].
pub struct LocalViewStore<K> {
    kv: K,
    prefix: String,
}

impl<K: KeyValueStore> LocalViewStore<K> {
    pub fn new(kv: K) -> Self {
        Self::with_prefix(kv, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(kv: K, prefix: impl Into<String>) -> Self {
        Self {
            kv,
            prefix: prefix.into(),
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &K {
        &self.kv
    }

    fn key(&self, scope: &ScopeKey, kind: RecordKind) -> String {
        ScopedKey::new(&self.prefix, scope, kind).encode()
    }

    fn read_views(&self, scope: &ScopeKey) -> StoreResult<Vec<SavedView>> {
        let key = self.key(scope, RecordKind::Views);
        let Some(raw) = self.kv.get_item(&key)? else {
            return Ok(Vec::new());
        };

        let entries: Vec<Value> = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            key: key.clone(),
            reason: e.to_string(),
        })?;

        let mut views = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<SavedView>(entry) {
                Ok(view) => views.push(view),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping unreadable saved view");
                }
            }
        }
        Ok(views)
    }

    fn views_write(&self, scope: &ScopeKey, views: &[SavedView]) -> StoreResult<KvWrite> {
        let json = serde_json::to_string(views).map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })?;
        Ok(KvWrite::put(self.key(scope, RecordKind::Views), json))
    }

    fn read_default(&self, scope: &ScopeKey) -> StoreResult<Option<ViewId>> {
        let key = self.key(scope, RecordKind::Default);
        let Some(raw) = self.kv.get_item(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<ViewId>(&raw) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring unreadable default view pointer");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<K: KeyValueStore> ViewStore for LocalViewStore<K> {
    async fn list(&self, scope: &ScopeKey) -> Vec<SavedView> {
        match self.read_views(scope) {
            Ok(views) => views,
            Err(e) => {
                tracing::warn!(scope = %scope, error = %e, "Failed to list saved views");
                Vec::new()
            }
        }
    }

    async fn save(&self, scope: &ScopeKey, view: NewSavedView) -> StoreResult<ViewId> {
        let mut views = self.read_views(scope)?;
        let view = SavedView::create(view);
        let id = view.id;
        views.push(view);
        self.kv.write_batch(vec![self.views_write(scope, &views)?])?;
        tracing::debug!(scope = %scope, view_id = %id, "Saved view");
        Ok(id)
    }

    async fn update(
        &self,
        scope: &ScopeKey,
        id: ViewId,
        patch: SavedViewPatch,
    ) -> StoreResult<()> {
        let mut views = self.read_views(scope)?;
        let Some(view) = views.iter_mut().find(|v| v.id == id) else {
            tracing::debug!(scope = %scope, view_id = %id, "Update of unknown view ignored");
            return Ok(());
        };
        view.apply_patch(patch);
        self.kv.write_batch(vec![self.views_write(scope, &views)?])
    }

    async fn delete(&self, scope: &ScopeKey, id: ViewId) -> StoreResult<()> {
        let mut views = self.read_views(scope)?;
        let before = views.len();
        views.retain(|v| v.id != id);
        if views.len() == before {
            return Ok(());
        }

        let mut writes = vec![self.views_write(scope, &views)?];
        if self.read_default(scope)? == Some(id) {
            writes.push(KvWrite::remove(self.key(scope, RecordKind::Default)));
        }
        self.kv.write_batch(writes)?;
        tracing::debug!(scope = %scope, view_id = %id, "Deleted view");
        Ok(())
    }

    async fn get_default_id(&self, scope: &ScopeKey) -> StoreResult<Option<ViewId>> {
        self.read_default(scope)
    }

    async fn set_default_id(&self, scope: &ScopeKey, id: Option<ViewId>) -> StoreResult<()> {
        let key = self.key(scope, RecordKind::Default);
        let write = match id {
            Some(id) => {
                let json = serde_json::to_string(&id).map_err(|e| StoreError::Serialization {
                    reason: e.to_string(),
                })?;
                KvWrite::put(key, json)
            }
            None => KvWrite::remove(key),
        };
        self.kv.write_batch(vec![write])
    }

    async fn get(&self, scope: &ScopeKey, id: ViewId) -> StoreResult<Option<SavedView>> {
        Ok(self.read_views(scope)?.into_iter().find(|v| v.id == id))
    }

    async fn clear_scope(&self, scope: &ScopeKey) -> StoreResult<u64> {
        let keys = self
            .kv
            .keys_with_prefix(&ScopedKey::scope_prefix(&self.prefix, scope))?;
        let removed = keys.len() as u64;
        if removed > 0 {
            self.kv
                .write_batch(keys.into_iter().map(KvWrite::remove).collect())?;
        }
        Ok(removed)
    }

    fn stats(&self) -> Option<StoreStats> {
        Some(self.kv.stats())
    }
}

// =============================================================================
// TESTS
// =============================================================================
