//! Column definition ordering.

use std::collections::HashSet;

/// Anything that carries a column id.
pub trait ColumnDef {
    fn column_id(&self) -> &str;
}

impl ColumnDef for String {
    fn column_id(&self) -> &str {
        self
    }
}

impl ColumnDef for &str {
    fn column_id(&self) -> &str {
        self
    }
}

/// Reorder column definitions by `order`.
///
/// Definitions named in `order` come first, in that sequence; the rest follow
/// in their original relative order. The result is always a permutation of
/// `defs`: ids in `order` with no definition are skipped, and a repeated id is
/// placed once.
pub fn order_columns<C: ColumnDef>(defs: Vec<C>, order: &[String]) -> Vec<C> {
    let mut slots: Vec<Option<C>> = defs.into_iter().map(Some).collect();
    let mut result = Vec::with_capacity(slots.len());
    let mut placed = HashSet::new();

    for id in order {
        if !placed.insert(id.as_str()) {
            continue;
        }
        let found = slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|def| def.column_id() == id.as_str()));
        if let Some(def) = found.and_then(|index| slots[index].take()) {
            result.push(def);
        }
    }

    result.extend(slots.into_iter().flatten());
    result
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Col {
        id: &'static str,
        width: u16,
    }

    impl ColumnDef for Col {
        fn column_id(&self) -> &str {
            self.id
        }
    }

    fn ids<C: ColumnDef>(defs: &[C]) -> Vec<&str> {
        defs.iter().map(ColumnDef::column_id).collect()
    }

    #[test]
    fn test_order_puts_named_first() {
        let all = vec!["code", "title", "status", "owner"];
        let ordered = order_columns(all, &["title".to_string()]);
        assert_eq!(ordered, vec!["title", "code", "status", "owner"]);
    }

    #[test]
    fn test_order_ignores_unknown_and_duplicates() {
        let all = vec![
            Col { id: "a", width: 10 },
            Col { id: "b", width: 20 },
            Col { id: "c", width: 30 },
        ];
        let order: Vec<String> = ["c", "ghost", "c", "a"].iter().map(|s| s.to_string()).collect();
        let ordered = order_columns(all, &order);
        assert_eq!(ids(&ordered), vec!["c", "a", "b"]);
        assert_eq!(ordered[0].width, 30);
    }

    #[test]
    fn test_empty_order_keeps_input() {
        let all = vec!["x".to_string(), "y".to_string()];
        assert_eq!(order_columns(all.clone(), &[]), all);
    }
}
