//! gridstate Test Utilities
//!
//! Shared test infrastructure for the gridstate workspace:
//! - Proptest generators for snapshots and column sets
//! - A fault-injecting store wrapper
//! - Fixtures for a typical grid screen
//! - Assertions for snapshot invariants

// Re-export core types for convenience
pub use gridstate_core::{
    AllowedColumns, ColumnState, Density, NewSavedView, RawSnapshot, SavedView, SavedViewPatch,
    ScopeKey, SortDirection, SortItem, StoreError, StoreResult, TokenCodec, ViewDefaults, ViewId,
    ViewSnapshot, PAGE_SIZES,
};
pub use gridstate_storage::{LocalViewStore, MemoryKvStore, StoreStats, ViewStore};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

// ============================================================================
// FAULT INJECTION
// ============================================================================

/// Wraps a [`ViewStore`] with switchable failures and artificial delays.
///
/// `get` sleeps before reading. `list` reads first and then sleeps, so its
/// result is stale by the time it is returned.
///
/// Reads that fail follow the trait contract: `list` returns an empty vec,
/// the rest return [`StoreError::Unavailable`].
pub struct FlakyStore {
    inner: Arc<dyn ViewStore>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    get_delay_ms: AtomicU64,
    list_delay_ms: AtomicU64,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn ViewStore>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            get_delay_ms: AtomicU64::new(0),
            list_delay_ms: AtomicU64::new(0),
        }
    }

    /// Wrap a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(LocalViewStore::new(MemoryKvStore::new())))
    }

    pub fn inner(&self) -> &Arc<dyn ViewStore> {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn delay_gets(&self, delay: Duration) {
        self.get_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn delay_lists(&self, delay: Duration) {
        self.list_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "injected read failure".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ViewStore for FlakyStore {
    async fn list(&self, scope: &ScopeKey) -> Vec<SavedView> {
        if self.check_read().is_err() {
            return Vec::new();
        }
        let views = self.inner.list(scope).await;
        let delay = self.list_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        views
    }

    async fn save(&self, scope: &ScopeKey, view: NewSavedView) -> StoreResult<ViewId> {
        self.check_write()?;
        self.inner.save(scope, view).await
    }

    async fn update(
        &self,
        scope: &ScopeKey,
        id: ViewId,
        patch: SavedViewPatch,
    ) -> StoreResult<()> {
        self.check_write()?;
        self.inner.update(scope, id, patch).await
    }

    async fn delete(&self, scope: &ScopeKey, id: ViewId) -> StoreResult<()> {
        self.check_write()?;
        self.inner.delete(scope, id).await
    }

    async fn get_default_id(&self, scope: &ScopeKey) -> StoreResult<Option<ViewId>> {
        self.check_read()?;
        self.inner.get_default_id(scope).await
    }

    async fn set_default_id(&self, scope: &ScopeKey, id: Option<ViewId>) -> StoreResult<()> {
        self.check_write()?;
        self.inner.set_default_id(scope, id).await
    }

    async fn get(&self, scope: &ScopeKey, id: ViewId) -> StoreResult<Option<SavedView>> {
        let delay = self.get_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check_read()?;
        self.inner.get(scope, id).await
    }

    async fn clear_scope(&self, scope: &ScopeKey) -> StoreResult<u64> {
        self.check_write()?;
        self.inner.clear_scope(scope).await
    }

    fn stats(&self) -> Option<StoreStats> {
        self.inner.stats()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for snapshots, including hostile ones.

    use super::*;
    use gridstate_core::sanitize;
    use proptest::prelude::*;
    use serde_json::{Map, Value};
    use uuid::Uuid;

    /// Column ids are drawn from a small pool so generated snapshots and
    /// allowed sets overlap often.
    const COLUMN_POOL: [&str; 8] = [
        "code", "title", "status", "owner", "total", "created", "legacyCol", "notes",
    ];

    pub fn arb_view_id() -> impl Strategy<Value = ViewId> {
        any::<[u8; 16]>().prop_map(|bytes| ViewId::new(Uuid::from_bytes(bytes)))
    }

    pub fn arb_scope_key() -> impl Strategy<Value = ScopeKey> {
        "[a-z][a-z0-9:/ %_-]{0,15}".prop_filter_map("blank scope", ScopeKey::new)
    }

    pub fn arb_column_id() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => prop::sample::select(COLUMN_POOL.to_vec()).prop_map(str::to_string),
            1 => "[a-z]{1,6}",
        ]
    }

    pub fn arb_allowed_columns() -> impl Strategy<Value = AllowedColumns> {
        prop::collection::vec(arb_column_id(), 0..8).prop_map(AllowedColumns::new)
    }

    /// Finite floats only: JSON has no NaN or infinity.
    pub fn arb_finite_f64() -> impl Strategy<Value = f64> {
        prop_oneof![
            prop::num::f64::NORMAL,
            prop::num::f64::SUBNORMAL,
            prop::num::f64::ZERO,
            any::<f64>().prop_filter("finite", |f| f.is_finite()),
        ]
    }

    pub fn arb_json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            arb_finite_f64().prop_map(Value::from),
            "[a-zA-Z0-9 _-]{0,10}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_id_array() -> impl Strategy<Value = Value> {
        prop::collection::vec(
            prop_oneof![
                6 => arb_column_id().prop_map(Value::from),
                1 => arb_json_value(),
            ],
            0..10,
        )
        .prop_map(Value::Array)
    }

    fn arb_columns_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            6 => (proptest::option::of(arb_id_array()), proptest::option::of(arb_id_array()))
                .prop_map(|(visible, order)| {
                    let mut columns = Map::new();
                    if let Some(visible) = visible {
                        columns.insert("visible".to_string(), visible);
                    }
                    if let Some(order) = order {
                        columns.insert("order".to_string(), order);
                    }
                    Value::Object(columns)
                }),
            1 => arb_json_value(),
        ]
    }

    fn arb_sort_value() -> impl Strategy<Value = Value> {
        let entry = prop_oneof![
            4 => (arb_column_id(), prop::sample::select(vec!["asc", "desc", "up", ""]))
                .prop_map(|(field, direction)| serde_json::json!({
                    "field": field,
                    "direction": direction,
                })),
            1 => arb_json_value(),
        ];
        prop_oneof![
            4 => prop::collection::vec(entry, 0..4).prop_map(Value::Array),
            1 => arb_json_value(),
        ]
    }

    fn arb_pagination_value() -> impl Strategy<Value = Value> {
        let size = prop_oneof![
            3 => prop::sample::select(PAGE_SIZES.to_vec()).prop_map(Value::from),
            2 => any::<u32>().prop_map(Value::from),
            1 => arb_json_value(),
        ];
        prop_oneof![
            4 => size.prop_map(|size| serde_json::json!({ "pageSize": size })),
            1 => arb_json_value(),
        ]
    }

    fn arb_density_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            3 => prop::sample::select(vec!["compact", "standard", "comfortable"])
                .prop_map(Value::from),
            1 => arb_json_value(),
        ]
    }

    fn arb_filters_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            4 => prop::collection::btree_map("[a-z]{1,6}", arb_json_value(), 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            1 => arb_json_value(),
        ]
    }

    /// Untrusted snapshots: every known facet may be missing, well-formed or
    /// garbage, plus unknown top-level keys.
    pub fn arb_raw_snapshot() -> impl Strategy<Value = RawSnapshot> {
        (
            proptest::option::of(prop_oneof![
                3 => (0u32..5).prop_map(Value::from),
                1 => arb_json_value(),
            ]),
            proptest::option::of(arb_columns_value()),
            proptest::option::of(arb_sort_value()),
            proptest::option::of(arb_pagination_value()),
            proptest::option::of(arb_density_value()),
            proptest::option::of(arb_filters_value()),
            prop::collection::btree_map("x[a-z]{1,5}", arb_json_value(), 0..3),
        )
            .prop_map(|(version, columns, sort, pagination, density, filters, extra)| {
                let mut map = Map::new();
                let facets = [
                    ("version", version),
                    ("columns", columns),
                    ("sort", sort),
                    ("pagination", pagination),
                    ("density", density),
                    ("filters", filters),
                ];
                for (key, value) in facets {
                    if let Some(value) = value {
                        map.insert(key.to_string(), value);
                    }
                }
                for (key, value) in extra {
                    map.insert(key, value);
                }
                RawSnapshot::from_map(map)
            })
    }

    /// An allowed column set with a hostile snapshot to sanitize against it.
    pub fn arb_snapshot_case() -> impl Strategy<Value = (AllowedColumns, RawSnapshot)> {
        (arb_allowed_columns(), arb_raw_snapshot())
    }

    /// A sanitized snapshot paired with the column set it was sanitized for.
    pub fn arb_view_snapshot() -> impl Strategy<Value = (AllowedColumns, ViewSnapshot)> {
        arb_snapshot_case().prop_map(|(allowed, raw)| {
            let snapshot = sanitize(&raw, &allowed);
            (allowed, snapshot)
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for an "orders" grid screen.

    use super::*;
    use gridstate_view::{ScreenSpec, ViewLocation, DEFAULT_TOKEN_PARAM};
    use serde_json::{json, Map};

    pub const SAMPLE_COLUMNS: [&str; 5] = ["code", "title", "status", "owner", "total"];

    pub fn sample_scope() -> ScopeKey {
        ScopeKey::new("orders:list").expect("fixture scope is not blank")
    }

    pub fn sample_allowed() -> AllowedColumns {
        AllowedColumns::new(SAMPLE_COLUMNS)
    }

    /// Orders screen: all columns, sorted by code, status filter defaulting
    /// to "open", `q` as legacy search parameter.
    pub fn sample_spec() -> ScreenSpec {
        let mut schema = Map::new();
        schema.insert("status".to_string(), json!("open"));
        schema.insert("q".to_string(), json!(""));

        ScreenSpec::new(sample_scope(), sample_allowed())
            .with_defaults(ViewDefaults {
                sort: Some(vec![SortItem::asc("code")]),
                page_size: Some(25),
                ..ViewDefaults::default()
            })
            .with_filter_schema(schema)
            .with_legacy_filter("q")
    }

    /// Page URL of the orders screen with the given query string.
    pub fn sample_url(query: &str) -> ViewLocation {
        let url = if query.is_empty() {
            "https://app.example.test/orders".to_string()
        } else {
            format!("https://app.example.test/orders?{query}")
        };
        ViewLocation::parse(&url, DEFAULT_TOKEN_PARAM).expect("fixture url must parse")
    }

    /// A snapshot that differs from the sample defaults in every facet.
    pub fn sample_custom_snapshot() -> ViewSnapshot {
        let mut filters = Map::new();
        filters.insert("status".to_string(), json!("closed"));
        filters.insert("q".to_string(), json!("acme"));
        ViewSnapshot {
            columns: ColumnState {
                visible: vec!["title".to_string(), "total".to_string()],
                order: vec!["total".to_string(), "title".to_string()],
            },
            sort: vec![SortItem::desc("total")],
            pagination: gridstate_core::Pagination { page_size: 50 },
            density: Density::Compact,
            filters,
            ..ViewSnapshot::default()
        }
    }

    /// In-memory provider as a trait object.
    pub fn memory_store() -> Arc<dyn ViewStore> {
        Arc::new(LocalViewStore::new(MemoryKvStore::new()))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for the invariants every sanitized snapshot must hold.

    use super::*;
    use std::collections::HashSet;

    /// Assert that `snapshot` satisfies every sanitized-snapshot invariant
    /// for `allowed`.
    #[track_caller]
    pub fn assert_sanitized(snapshot: &ViewSnapshot, allowed: &AllowedColumns) {
        for id in snapshot.columns.visible.iter().chain(&snapshot.columns.order) {
            assert!(allowed.contains(id), "column {id:?} is not allowed");
        }

        let order: HashSet<&String> = snapshot.columns.order.iter().collect();
        assert_eq!(
            order.len(),
            snapshot.columns.order.len(),
            "order has duplicates: {:?}",
            snapshot.columns.order
        );
        let visible: HashSet<&String> = snapshot.columns.visible.iter().collect();
        assert_eq!(
            visible.len(),
            snapshot.columns.visible.len(),
            "visible has duplicates: {:?}",
            snapshot.columns.visible
        );
        for id in &snapshot.columns.visible {
            assert!(order.contains(id), "visible column {id:?} missing from order");
        }

        assert!(
            PAGE_SIZES.contains(&snapshot.pagination.page_size),
            "page size {} not in {:?}",
            snapshot.pagination.page_size,
            PAGE_SIZES
        );
    }

    /// Assert that two snapshots describe the same view.
    #[track_caller]
    pub fn assert_same_view(actual: &ViewSnapshot, expected: &ViewSnapshot) {
        assert_eq!(actual.columns, expected.columns, "columns differ");
        assert_eq!(actual.sort, expected.sort, "sort differs");
        assert_eq!(actual.pagination, expected.pagination, "pagination differs");
        assert_eq!(actual.density, expected.density, "density differs");
        assert_eq!(actual.filters, expected.filters, "filters differ");
    }
}

// ============================================================================
// TESTS
// ============================================================================
