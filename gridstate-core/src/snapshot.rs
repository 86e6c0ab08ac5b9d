//! View snapshot model: canonical shape, defaults, merge and sanitize.
//!
//! Two representations are used:
//!
//! - [`RawSnapshot`] is the open JSON object as it arrives from a URL token,
//!   from storage, or from a merge. Nothing about it is trusted.
//! - [`ViewSnapshot`] is the typed, normalized form. The only way to obtain
//!   one from untrusted data is [`sanitize`].
//!
//! Unknown top-level fields are kept in [`ViewSnapshot::extra`] so that a
//! snapshot written by a newer schema survives a round trip through an older
//! one.

use serde::ser::{Serialize, Serializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Current snapshot schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Page sizes a snapshot may carry.
pub const PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

/// Page size used when the stored one is missing or not allowed.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

const VERSION_KEY: &str = "version";
const COLUMNS_KEY: &str = "columns";
const SORT_KEY: &str = "sort";
const PAGINATION_KEY: &str = "pagination";
const DENSITY_KEY: &str = "density";
const FILTERS_KEY: &str = "filters";

const KNOWN_KEYS: [&str; 6] = [
    VERSION_KEY,
    COLUMNS_KEY,
    SORT_KEY,
    PAGINATION_KEY,
    DENSITY_KEY,
    FILTERS_KEY,
];

// ============================================================================
// FACET TYPES
// ============================================================================

/// Column visibility and ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct ColumnState {
    /// Visible column ids, in display order.
    pub visible: Vec<String>,
    /// Full column order; after sanitize a superset of `visible`.
    pub order: Vec<String>,
}

impl ColumnState {
    pub fn new<I, S>(visible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let visible: Vec<String> = visible.into_iter().map(Into::into).collect();
        Self {
            order: visible.clone(),
            visible,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// One entry of a multi-column sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
pub struct SortItem {
    pub field: String,
    pub direction: SortDirection,
}

impl SortItem {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let field = value.get("field")?.as_str()?;
        if field.is_empty() {
            return None;
        }
        let direction = SortDirection::parse(value.get("direction")?.as_str()?)?;
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct Pagination {
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Row density of the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    #[default]
    Standard,
    Comfortable,
}

impl Density {
    pub fn as_str(&self) -> &'static str {
        match self {
            Density::Compact => "compact",
            Density::Standard => "standard",
            Density::Comfortable => "comfortable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "compact" => Some(Density::Compact),
            "standard" => Some(Density::Standard),
            "comfortable" => Some(Density::Comfortable),
            _ => None,
        }
    }
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// Normalized view state. Produced by [`make_default`] and [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub version: u32,
    pub columns: ColumnState,
    pub sort: Vec<SortItem>,
    pub pagination: Pagination,
    pub density: Density,
    pub filters: Map<String, Value>,
    /// Unknown top-level fields, carried through untouched.
    pub extra: Map<String, Value>,
}

impl Default for ViewSnapshot {
    fn default() -> Self {
        make_default(ViewDefaults::default())
    }
}

impl ViewSnapshot {
    /// Convert to the open JSON form. Known facets take precedence over any
    /// same-named key in `extra`.
    pub fn to_raw(&self) -> RawSnapshot {
        let mut map = Map::new();
        map.insert(VERSION_KEY.to_string(), Value::from(self.version));

        let mut columns = Map::new();
        columns.insert("visible".to_string(), string_array(&self.columns.visible));
        columns.insert("order".to_string(), string_array(&self.columns.order));
        map.insert(COLUMNS_KEY.to_string(), Value::Object(columns));

        let sort = self
            .sort
            .iter()
            .map(|item| {
                let mut entry = Map::new();
                entry.insert("field".to_string(), Value::from(item.field.clone()));
                entry.insert("direction".to_string(), Value::from(item.direction.as_str()));
                Value::Object(entry)
            })
            .collect();
        map.insert(SORT_KEY.to_string(), Value::Array(sort));

        let mut pagination = Map::new();
        pagination.insert("pageSize".to_string(), Value::from(self.pagination.page_size));
        map.insert(PAGINATION_KEY.to_string(), Value::Object(pagination));

        map.insert(DENSITY_KEY.to_string(), Value::from(self.density.as_str()));
        map.insert(FILTERS_KEY.to_string(), Value::Object(self.filters.clone()));

        for (key, value) in &self.extra {
            if !map.contains_key(key) {
                map.insert(key.clone(), value.clone());
            }
        }
        RawSnapshot(map)
    }

    /// String value of a filter, if present and a string.
    pub fn filter_str(&self, key: &str) -> Option<&str> {
        self.filters.get(key).and_then(Value::as_str)
    }
}

impl Serialize for ViewSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(serializer)
    }
}

impl From<&ViewSnapshot> for RawSnapshot {
    fn from(snapshot: &ViewSnapshot) -> Self {
        snapshot.to_raw()
    }
}

impl From<ViewSnapshot> for RawSnapshot {
    fn from(snapshot: ViewSnapshot) -> Self {
        snapshot.to_raw()
    }
}

/// Unvalidated snapshot as an open JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct RawSnapshot(Map<String, Value>);

impl RawSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Accept a JSON value only if it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style insert of a top-level facet.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Caller-supplied defaults for [`make_default`]. Absent pieces fall back to
/// the baseline values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewDefaults {
    pub columns: Option<ColumnState>,
    pub sort: Option<Vec<SortItem>>,
    pub page_size: Option<u32>,
    pub density: Option<Density>,
    pub filters: Option<Map<String, Value>>,
}

/// Ordered set of column ids a screen currently offers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedColumns {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl AllowedColumns {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allowed = Self::default();
        for id in ids {
            let id = id.into();
            if allowed.index.insert(id.clone()) {
                allowed.ids.push(id);
            }
        }
        allowed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Ids in declaration order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedColumns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Build a snapshot from defaults, filling absent pieces with the baseline
/// (`pageSize = 10`, `density = standard`, no sort, no filters, no columns).
///
/// No clamping happens here; run the result through [`sanitize`] before use.
pub fn make_default(defaults: ViewDefaults) -> ViewSnapshot {
    ViewSnapshot {
        version: CURRENT_VERSION,
        columns: defaults.columns.unwrap_or_default(),
        sort: defaults.sort.unwrap_or_default(),
        pagination: Pagination {
            page_size: defaults.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        },
        density: defaults.density.unwrap_or_default(),
        filters: defaults.filters.unwrap_or_default(),
        extra: Map::new(),
    }
}

/// Layer `overlay` onto `base`.
///
/// Each top-level key present in `overlay` replaces the one in `base`, except
/// `columns`, whose `visible` and `order` are replaced independently when both
/// sides are objects. Keys absent from `overlay` are left alone, including
/// unknown ones. No validation is done.
pub fn merge(base: &RawSnapshot, overlay: Option<&RawSnapshot>) -> RawSnapshot {
    let mut merged = base.clone();
    let Some(overlay) = overlay else {
        return merged;
    };

    for (key, value) in overlay.as_map() {
        if key == COLUMNS_KEY {
            if let (Some(Value::Object(base_columns)), Value::Object(overlay_columns)) =
                (merged.0.get_mut(COLUMNS_KEY), value)
            {
                for (facet, facet_value) in overlay_columns {
                    base_columns.insert(facet.clone(), facet_value.clone());
                }
                continue;
            }
        }
        merged.0.insert(key.clone(), value.clone());
    }
    merged
}

/// Normalize an untrusted snapshot against the allowed column set.
///
/// Column ids outside `allowed` are dropped, `order` is extended with any
/// visible id it lacks, page size and density are clamped to their
/// enumerations, and `sort`/`filters` are coerced to an array/object.
/// Idempotent and total.
pub fn sanitize(raw: &RawSnapshot, allowed: &AllowedColumns) -> ViewSnapshot {
    let map = raw.as_map();

    let version = map
        .get(VERSION_KEY)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(CURRENT_VERSION);

    let columns = sanitize_columns(map.get(COLUMNS_KEY), allowed);

    let sort = match map.get(SORT_KEY) {
        Some(Value::Array(items)) => items.iter().filter_map(SortItem::from_value).collect(),
        _ => Vec::new(),
    };

    let page_size = map
        .get(PAGINATION_KEY)
        .and_then(|p| p.get("pageSize"))
        .and_then(clamp_page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let density = map
        .get(DENSITY_KEY)
        .and_then(Value::as_str)
        .and_then(Density::parse)
        .unwrap_or_default();

    let filters = match map.get(FILTERS_KEY) {
        Some(Value::Object(filters)) => filters.clone(),
        _ => Map::new(),
    };

    let extra = map
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    ViewSnapshot {
        version,
        columns,
        sort,
        pagination: Pagination { page_size },
        density,
        filters,
        extra,
    }
}

fn sanitize_columns(columns: Option<&Value>, allowed: &AllowedColumns) -> ColumnState {
    let visible = allowed_ids(columns.and_then(|c| c.get("visible")), allowed);
    let mut order = allowed_ids(columns.and_then(|c| c.get("order")), allowed);

    let mut in_order: HashSet<String> = order.iter().cloned().collect();
    for id in &visible {
        if in_order.insert(id.clone()) {
            order.push(id.clone());
        }
    }

    ColumnState { visible, order }
}

/// String ids of a JSON array that are allowed, first occurrence only.
fn allowed_ids(value: Option<&Value>, allowed: &AllowedColumns) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|id| allowed.contains(id) && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

fn clamp_page_size(value: &Value) -> Option<u32> {
    let size = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
            .map(|f| f as u64)
    })?;
    PAGE_SIZES.iter().copied().find(|allowed| u64::from(*allowed) == size)
}

fn string_array(ids: &[String]) -> Value {
    Value::Array(ids.iter().cloned().map(Value::from).collect())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSnapshot {
        RawSnapshot::from_value(value).expect("test snapshot must be an object")
    }

    fn allowed(ids: &[&str]) -> AllowedColumns {
        AllowedColumns::new(ids.iter().copied())
    }

    #[test]
    fn test_make_default_uses_baseline() {
        let snapshot = make_default(ViewDefaults::default());
        assert_eq!(snapshot.version, CURRENT_VERSION);
        assert_eq!(snapshot.pagination.page_size, 10);
        assert_eq!(snapshot.density, Density::Standard);
        assert!(snapshot.sort.is_empty());
        assert!(snapshot.filters.is_empty());
        assert!(snapshot.columns.visible.is_empty());
    }

    #[test]
    fn test_make_default_keeps_supplied_pieces() {
        let snapshot = make_default(ViewDefaults {
            columns: Some(ColumnState::new(["code", "title"])),
            sort: Some(vec![SortItem::desc("code")]),
            page_size: Some(50),
            density: Some(Density::Compact),
            filters: None,
        });
        assert_eq!(snapshot.columns.order, vec!["code", "title"]);
        assert_eq!(snapshot.sort, vec![SortItem::desc("code")]);
        assert_eq!(snapshot.pagination.page_size, 50);
        assert_eq!(snapshot.density, Density::Compact);
    }

    #[test]
    fn test_sanitize_drops_unknown_columns() {
        let input = raw(json!({
            "columns": {
                "visible": ["code", "title", "legacyCol"],
                "order": ["code", "title", "legacyCol"]
            }
        }));
        let snapshot = sanitize(&input, &allowed(&["code", "title"]));
        assert_eq!(snapshot.columns.order, vec!["code", "title"]);
        assert_eq!(snapshot.columns.visible, vec!["code", "title"]);
    }

    #[test]
    fn test_sanitize_appends_visible_missing_from_order() {
        let input = raw(json!({
            "columns": { "visible": ["c", "a"], "order": ["b", "a"] }
        }));
        let snapshot = sanitize(&input, &allowed(&["a", "b", "c"]));
        assert_eq!(snapshot.columns.order, vec!["b", "a", "c"]);
        assert_eq!(snapshot.columns.visible, vec!["c", "a"]);
    }

    #[test]
    fn test_sanitize_clamps_page_size() {
        let input = raw(json!({ "pagination": { "pageSize": 37 } }));
        assert_eq!(sanitize(&input, &allowed(&[])).pagination.page_size, 10);

        let input = raw(json!({ "pagination": { "pageSize": 25 } }));
        assert_eq!(sanitize(&input, &allowed(&[])).pagination.page_size, 25);

        let input = raw(json!({ "pagination": { "pageSize": 100.0 } }));
        assert_eq!(sanitize(&input, &allowed(&[])).pagination.page_size, 100);

        let input = raw(json!({ "pagination": { "pageSize": "50" } }));
        assert_eq!(sanitize(&input, &allowed(&[])).pagination.page_size, 10);
    }

    #[test]
    fn test_sanitize_clamps_density() {
        let input = raw(json!({ "density": "cozy" }));
        assert_eq!(sanitize(&input, &allowed(&[])).density, Density::Standard);

        let input = raw(json!({ "density": "comfortable" }));
        assert_eq!(sanitize(&input, &allowed(&[])).density, Density::Comfortable);
    }

    #[test]
    fn test_sanitize_coerces_sort_and_filters() {
        let input = raw(json!({ "sort": null, "filters": [1, 2] }));
        let snapshot = sanitize(&input, &allowed(&[]));
        assert!(snapshot.sort.is_empty());
        assert!(snapshot.filters.is_empty());

        let input = raw(json!({
            "sort": [
                { "field": "code", "direction": "desc" },
                { "field": "title", "direction": "sideways" },
                "garbage"
            ]
        }));
        let snapshot = sanitize(&input, &allowed(&[]));
        assert_eq!(snapshot.sort, vec![SortItem::desc("code")]);
    }

    #[test]
    fn test_sanitize_keeps_unknown_fields() {
        let input = raw(json!({ "version": 3, "grouping": ["region"] }));
        let snapshot = sanitize(&input, &allowed(&[]));
        assert_eq!(snapshot.version, 3);
        assert_eq!(snapshot.extra.get("grouping"), Some(&json!(["region"])));
        assert_eq!(snapshot.to_raw().get("grouping"), Some(&json!(["region"])));
    }

    #[test]
    fn test_sanitize_is_idempotent_on_messy_input() {
        let cols = allowed(&["a", "b"]);
        let input = raw(json!({
            "version": "x",
            "columns": { "visible": ["b", "b", 7, "zz"], "order": "nope" },
            "pagination": { "pageSize": -1 },
            "density": 4,
            "filters": { "q": "abc" },
            "future": { "nested": true }
        }));
        let once = sanitize(&input, &cols);
        let twice = sanitize(&once.to_raw(), &cols);
        assert_eq!(once, twice);
        assert_eq!(once.columns.visible, vec!["b"]);
        assert_eq!(once.columns.order, vec!["b"]);
    }

    #[test]
    fn test_merge_replaces_present_facets_only() {
        let base = make_default(ViewDefaults {
            columns: Some(ColumnState::new(["a", "b"])),
            ..Default::default()
        })
        .to_raw();
        let overlay = raw(json!({ "density": "compact" }));
        let merged = merge(&base, Some(&overlay));
        assert_eq!(merged.get("density"), Some(&json!("compact")));
        assert_eq!(merged.get("columns"), base.get("columns"));
        assert_eq!(merged.get("pagination"), base.get("pagination"));
    }

    #[test]
    fn test_merge_columns_facets_independently() {
        let base = raw(json!({ "columns": { "visible": ["a"], "order": ["b", "a"] } }));
        let overlay = raw(json!({ "columns": { "visible": ["b"] } }));
        let merged = merge(&base, Some(&overlay));
        assert_eq!(
            merged.get("columns"),
            Some(&json!({ "visible": ["b"], "order": ["b", "a"] }))
        );
    }

    #[test]
    fn test_merge_without_overlay_is_identity() {
        let base = raw(json!({ "density": "compact", "other": 1 }));
        assert_eq!(merge(&base, None), base);
    }

    #[test]
    fn test_merge_keeps_unknown_fields_from_both_sides() {
        let base = raw(json!({ "fromBase": 1 }));
        let overlay = raw(json!({ "fromOverlay": 2 }));
        let merged = merge(&base, Some(&overlay));
        assert_eq!(merged.get("fromBase"), Some(&json!(1)));
        assert_eq!(merged.get("fromOverlay"), Some(&json!(2)));
    }

    #[test]
    fn test_merge_overwrite_idempotent() {
        let base = raw(json!({ "density": "standard", "columns": { "order": ["a"] } }));
        let overlay = raw(json!({ "density": "compact", "columns": { "visible": ["a"] } }));
        let once = merge(&base, Some(&overlay));
        let twice = merge(&once, Some(&overlay));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let snapshot = make_default(ViewDefaults {
            sort: Some(vec![SortItem::asc("code")]),
            ..Default::default()
        });
        let json = serde_json::to_value(&snapshot).expect("serialize");
        assert_eq!(json["pagination"]["pageSize"], json!(10));
        assert_eq!(json["sort"][0]["direction"], json!("asc"));
        assert_eq!(json["density"], json!("standard"));
    }
}
