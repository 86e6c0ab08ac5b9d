//! View controller: one grid screen's live snapshot, its URL and its saved
//! views.
//!
//! # Resolution
//!
//! On [`ViewController::load`] the initial snapshot comes from, in order:
//! 1. a decodable view token in the URL,
//! 2. the scope's default saved view,
//! 3. the screen defaults.
//!
//! Each candidate is merged over the defaults and sanitized against the
//! screen's allowed columns. Store failures fall through to the next step.
//!
//! # Request gating
//!
//! Operations that install a snapshot after awaiting the store take a ticket
//! from a monotonically increasing counter. Local mutations and
//! [`ViewController::close`] advance the counter, so a response that arrives
//! after a newer change is dropped instead of overwriting it.
//!
//! The cached saved-view list has its own counter. [`ViewController::refresh`]
//! holds a ticket from it, and deletes and default changes advance it, so a
//! slow refresh never resurrects a deleted view or an old default.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gridstate_core::{
    make_default, merge, order_columns, sanitize, ColumnDef, Density, NewSavedView, RawSnapshot,
    SavedView, SortItem, TokenCodec, ViewId, ViewSnapshot,
};
use gridstate_storage::ViewStore;
use serde_json::{Map, Value};

use crate::error::ViewResult;
use crate::location::ViewLocation;
use crate::screen::ScreenSpec;

/// Result of [`ViewController::apply_saved_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The saved view is now the live snapshot.
    Applied,
    /// No view with that id exists in the scope.
    NotFound,
    /// A newer change landed while the view was loading; nothing installed.
    Superseded,
}

/// Where the initial snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSource {
    UrlToken,
    ScopeDefault(ViewId),
    Defaults,
}

#[derive(Debug)]
struct ControllerState {
    snapshot: ViewSnapshot,
    location: ViewLocation,
    saved_views: Vec<SavedView>,
    default_id: Option<ViewId>,
}

/// Live view state of one mounted grid.
pub struct ViewController {
    spec: ScreenSpec,
    defaults: RawSnapshot,
    store: Arc<dyn ViewStore>,
    codec: TokenCodec,
    state: RwLock<ControllerState>,
    generation: AtomicU64,
    views_generation: AtomicU64,
    closed: AtomicBool,
    source: InitialSource,
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("scope", &self.spec.scope)
            .field("source", &self.source)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ViewController {
    /// Resolve the initial snapshot and load the scope's saved views.
    ///
    /// Never fails: an unreadable store behaves like an empty one.
    pub async fn load(
        spec: ScreenSpec,
        store: Arc<dyn ViewStore>,
        mut location: ViewLocation,
        codec: TokenCodec,
    ) -> Self {
        let defaults = RawSnapshot::from(make_default(spec.effective_defaults()));

        let decoded = location.token().and_then(|token| codec.deserialize(&token));
        let had_token = location.token().is_some();

        let (raw, source) = match decoded {
            Some(decoded) => {
                tracing::debug!(scope = %spec.scope, "Resolved view from URL token");
                (merge(&defaults, Some(&decoded)), InitialSource::UrlToken)
            }
            None => match Self::load_default_view(store.as_ref(), &spec).await {
                Some(view) => {
                    tracing::debug!(scope = %spec.scope, view_id = %view.id, "Resolved scope default view");
                    (
                        merge(&defaults, Some(&view.snapshot)),
                        InitialSource::ScopeDefault(view.id),
                    )
                }
                None => {
                    tracing::debug!(scope = %spec.scope, "Resolved screen defaults");
                    (defaults.clone(), InitialSource::Defaults)
                }
            },
        };

        let mut snapshot = sanitize(&raw, &spec.allowed_columns);
        spec.seed_filters(&mut snapshot.filters);

        let mut legacy_present = false;
        if let Some(param) = &spec.legacy_filter {
            if let Some(value) = location.param(param) {
                legacy_present = true;
                if source != InitialSource::UrlToken {
                    snapshot.filters.insert(param.clone(), Value::String(value));
                }
            }
        }

        if had_token || legacy_present {
            sync_location(&spec, &codec, &snapshot, &mut location);
        }

        let saved_views = store.list(&spec.scope).await;
        let default_id = match source {
            InitialSource::ScopeDefault(id) => Some(id),
            _ => read_default_id(store.as_ref(), &spec).await,
        };

        Self {
            spec,
            defaults,
            store,
            codec,
            state: RwLock::new(ControllerState {
                snapshot,
                location,
                saved_views,
                default_id,
            }),
            generation: AtomicU64::new(0),
            views_generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            source,
        }
    }

    async fn load_default_view(store: &dyn ViewStore, spec: &ScreenSpec) -> Option<SavedView> {
        let id = read_default_id(store, spec).await?;
        match store.get(&spec.scope, id).await {
            Ok(Some(view)) => Some(view),
            Ok(None) => {
                tracing::warn!(scope = %spec.scope, view_id = %id, "Default view pointer is dangling");
                None
            }
            Err(e) => {
                tracing::warn!(scope = %spec.scope, view_id = %id, error = %e, "Failed to load default view");
                None
            }
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ControllerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ControllerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn advance_views(&self) -> u64 {
        self.views_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn spec(&self) -> &ScreenSpec {
        &self.spec
    }

    pub fn source(&self) -> InitialSource {
        self.source
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.read_state().snapshot.clone()
    }

    /// Cached saved views of the scope, as of the last load or write.
    pub fn saved_views(&self) -> Vec<SavedView> {
        self.read_state().saved_views.clone()
    }

    pub fn default_id(&self) -> Option<ViewId> {
        self.read_state().default_id
    }

    /// The URL the host should display.
    pub fn location(&self) -> ViewLocation {
        self.read_state().location.clone()
    }

    /// Arrange column definitions by the live column order.
    pub fn order_columns<C: ColumnDef>(&self, defs: Vec<C>) -> Vec<C> {
        let order = self.read_state().snapshot.columns.order.clone();
        order_columns(defs, &order)
    }

    /// The page URL with the token set to the live snapshot.
    pub fn shareable_location(&self) -> ViewLocation {
        let state = self.read_state();
        let mut location = state.location.clone();
        location.set_token(&self.codec.serialize(&state.snapshot));
        location
    }

    /// Path and query of [`Self::shareable_location`].
    pub fn to_shareable_url(&self) -> String {
        self.shareable_location().to_relative()
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    fn mutate(&self, change: impl FnOnce(&mut ViewSnapshot)) -> ViewSnapshot {
        self.advance();
        let mut state = self.write_state();
        let mut next = state.snapshot.clone();
        change(&mut next);
        self.install(&mut state, &next.to_raw())
    }

    fn install(&self, state: &mut ControllerState, raw: &RawSnapshot) -> ViewSnapshot {
        let mut snapshot = sanitize(raw, &self.spec.allowed_columns);
        self.spec.seed_filters(&mut snapshot.filters);
        sync_location(&self.spec, &self.codec, &snapshot, &mut state.location);
        state.snapshot = snapshot.clone();
        snapshot
    }

    pub fn set_sort(&self, sort: Vec<SortItem>) -> ViewSnapshot {
        self.mutate(|snapshot| snapshot.sort = sort)
    }

    /// Apply a column visibility model. Columns absent from `model` count as
    /// visible.
    pub fn set_column_visibility(&self, model: &HashMap<String, bool>) -> ViewSnapshot {
        let visible: Vec<String> = self
            .spec
            .allowed_columns
            .ids()
            .iter()
            .filter(|id| model.get(id.as_str()) != Some(&false))
            .cloned()
            .collect();
        self.mutate(|snapshot| snapshot.columns.visible = visible)
    }

    pub fn set_column_order(&self, order: Vec<String>) -> ViewSnapshot {
        self.mutate(|snapshot| snapshot.columns.order = order)
    }

    pub fn set_page_size(&self, page_size: u32) -> ViewSnapshot {
        self.mutate(|snapshot| snapshot.pagination.page_size = page_size)
    }

    pub fn set_density(&self, density: Density) -> ViewSnapshot {
        self.mutate(|snapshot| snapshot.density = density)
    }

    /// Replace the filter bag. Schema keys the new bag lacks are re-seeded.
    pub fn set_filters(&self, filters: Map<String, Value>) -> ViewSnapshot {
        self.mutate(|snapshot| snapshot.filters = filters)
    }

    // ========================================================================
    // SAVED VIEWS
    // ========================================================================

    /// Re-read the scope's saved views and default pointer.
    ///
    /// Returns what the store reported. The cache is only updated if no
    /// newer refresh, delete or default change landed meanwhile and the
    /// controller is still open.
    pub async fn refresh(&self) -> Vec<SavedView> {
        let ticket = self.advance_views();
        let views = self.store.list(&self.spec.scope).await;
        let default_id = read_default_id(self.store.as_ref(), &self.spec).await;

        let mut state = self.write_state();
        if self.closed.load(Ordering::SeqCst)
            || self.views_generation.load(Ordering::SeqCst) != ticket
        {
            tracing::debug!(scope = %self.spec.scope, "Discarding superseded saved view list");
            return views;
        }
        state.saved_views = views.clone();
        state.default_id = default_id;
        views
    }

    /// Persist the live snapshot under `name`.
    pub async fn save_current_as(&self, name: impl Into<String>) -> ViewResult<ViewId> {
        let snapshot = self.snapshot();
        let id = self
            .store
            .save(&self.spec.scope, NewSavedView::new(name, &snapshot))
            .await?;
        tracing::debug!(scope = %self.spec.scope, view_id = %id, "Saved current view");
        self.refresh().await;
        Ok(id)
    }

    /// Load a saved view and make it the live snapshot.
    pub async fn apply_saved_view(&self, id: ViewId) -> ViewResult<ApplyOutcome> {
        let ticket = self.advance();
        let Some(view) = self.store.get(&self.spec.scope, id).await? else {
            tracing::debug!(scope = %self.spec.scope, view_id = %id, "Saved view not found");
            return Ok(ApplyOutcome::NotFound);
        };

        let mut state = self.write_state();
        if self.closed.load(Ordering::SeqCst) || self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!(scope = %self.spec.scope, view_id = %id, "Discarding superseded saved view");
            return Ok(ApplyOutcome::Superseded);
        }
        let raw = merge(&self.defaults, Some(&view.snapshot));
        self.install(&mut state, &raw);
        Ok(ApplyOutcome::Applied)
    }

    pub async fn rename_view(&self, id: ViewId, name: impl Into<String>) -> ViewResult<()> {
        self.store.rename(&self.spec.scope, id, name.into()).await?;
        self.refresh().await;
        Ok(())
    }

    /// Delete a saved view. The default pointer goes with it when it matched.
    pub async fn delete_view(&self, id: ViewId) -> ViewResult<()> {
        self.store.delete(&self.spec.scope, id).await?;
        let mut state = self.write_state();
        self.advance_views();
        state.saved_views.retain(|view| view.id != id);
        if state.default_id == Some(id) {
            state.default_id = None;
        }
        Ok(())
    }

    pub async fn set_default_view_id(&self, id: Option<ViewId>) -> ViewResult<()> {
        self.store.set_default_id(&self.spec.scope, id).await?;
        let mut state = self.write_state();
        self.advance_views();
        state.default_id = id;
        Ok(())
    }

    /// Tear down: every in-flight request resolves as superseded.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.advance();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

async fn read_default_id(store: &dyn ViewStore, spec: &ScreenSpec) -> Option<ViewId> {
    match store.get_default_id(&spec.scope).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(scope = %spec.scope, error = %e, "Failed to read default view pointer");
            None
        }
    }
}

/// Rewrite the token and the legacy parameter from `snapshot`.
fn sync_location(
    spec: &ScreenSpec,
    codec: &TokenCodec,
    snapshot: &ViewSnapshot,
    location: &mut ViewLocation,
) {
    location.set_token(&codec.serialize(snapshot));
    if let Some(param) = &spec.legacy_filter {
        let value = snapshot.filter_str(param).filter(|value| !value.is_empty());
        location.set_param(param, value);
    }
}
