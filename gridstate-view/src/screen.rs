//! What a screen declares when it mounts a grid.

use gridstate_core::{AllowedColumns, ColumnState, ScopeKey, ViewDefaults};
use serde_json::{Map, Value};

/// Consumer contract of a grid screen.
#[derive(Debug, Clone)]
pub struct ScreenSpec {
    pub scope: ScopeKey,
    pub allowed_columns: AllowedColumns,
    pub defaults: ViewDefaults,
    /// Filter name to default value. Seeds any key the snapshot lacks.
    pub filter_schema: Map<String, Value>,
    /// Plain query parameter mirrored into `filters[<same name>]`.
    pub legacy_filter: Option<String>,
}

impl ScreenSpec {
    pub fn new(scope: ScopeKey, allowed_columns: AllowedColumns) -> Self {
        Self {
            scope,
            allowed_columns,
            defaults: ViewDefaults::default(),
            filter_schema: Map::new(),
            legacy_filter: None,
        }
    }

    pub fn with_defaults(mut self, defaults: ViewDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_filter_schema(mut self, schema: Map<String, Value>) -> Self {
        self.filter_schema = schema;
        self
    }

    pub fn with_legacy_filter(mut self, param: impl Into<String>) -> Self {
        self.legacy_filter = Some(param.into());
        self
    }

    /// Defaults with absent columns filled from the allowed set and the
    /// filter schema layered under any explicit default filters.
    pub(crate) fn effective_defaults(&self) -> ViewDefaults {
        let mut defaults = self.defaults.clone();
        if defaults.columns.is_none() {
            defaults.columns = Some(ColumnState::new(self.allowed_columns.ids().iter().cloned()));
        }

        let mut filters = self.filter_schema.clone();
        if let Some(explicit) = defaults.filters.take() {
            for (key, value) in explicit {
                filters.insert(key, value);
            }
        }
        defaults.filters = Some(filters);
        defaults
    }

    /// Fill filter keys the bag lacks from the schema.
    pub(crate) fn seed_filters(&self, filters: &mut Map<String, Value>) {
        for (key, default) in &self.filter_schema {
            if !filters.contains_key(key) {
                filters.insert(key.clone(), default.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> ScreenSpec {
        let scope = ScopeKey::new("orders").expect("scope");
        ScreenSpec::new(scope, AllowedColumns::new(["code", "title", "total"]))
    }

    #[test]
    fn test_columns_default_to_allowed_set() {
        let defaults = spec().effective_defaults();
        let columns = defaults.columns.expect("columns filled");
        assert_eq!(columns.visible, vec!["code", "title", "total"]);
        assert_eq!(columns.order, columns.visible);
    }

    #[test]
    fn test_explicit_columns_kept() {
        let defaults = spec()
            .with_defaults(ViewDefaults {
                columns: Some(ColumnState::new(["title"])),
                ..ViewDefaults::default()
            })
            .effective_defaults();
        assert_eq!(defaults.columns.expect("columns").visible, vec!["title"]);
    }

    #[test]
    fn test_explicit_filters_override_schema() {
        let mut schema = Map::new();
        schema.insert("status".to_string(), json!("open"));
        schema.insert("q".to_string(), json!(""));
        let mut explicit = Map::new();
        explicit.insert("status".to_string(), json!("closed"));

        let defaults = spec()
            .with_filter_schema(schema)
            .with_defaults(ViewDefaults {
                filters: Some(explicit),
                ..ViewDefaults::default()
            })
            .effective_defaults();

        let filters = defaults.filters.expect("filters");
        assert_eq!(filters.get("status"), Some(&json!("closed")));
        assert_eq!(filters.get("q"), Some(&json!("")));
    }

    #[test]
    fn test_seed_filters_only_fills_missing() {
        let mut schema = Map::new();
        schema.insert("status".to_string(), json!("open"));
        schema.insert("owner".to_string(), Value::Null);
        let spec = spec().with_filter_schema(schema);

        let mut filters = Map::new();
        filters.insert("status".to_string(), json!("closed"));
        spec.seed_filters(&mut filters);

        assert_eq!(filters.get("status"), Some(&json!("closed")));
        assert_eq!(filters.get("owner"), Some(&Value::Null));
    }
}
