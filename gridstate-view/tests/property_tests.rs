//! Property-Based Tests for controller mutations
//!
//! Properties:
//! - after any sequence of mutations the live snapshot is sanitized
//! - the URL token always decodes back to the live snapshot
//! - the legacy parameter always mirrors the non-empty string filter

use std::collections::HashMap;

use gridstate_core::{sanitize, Density, SortItem, TokenCodec};
use gridstate_test_utils::assertions::assert_sanitized;
use gridstate_test_utils::fixtures;
use gridstate_test_utils::generators::{arb_column_id, arb_json_value};
use gridstate_view::ViewController;
use proptest::prelude::*;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
enum Mutation {
    Sort(Vec<SortItem>),
    Visibility(HashMap<String, bool>),
    Order(Vec<String>),
    PageSize(u32),
    Density(Density),
    Filters(Map<String, Value>),
}

fn arb_sort_item() -> impl Strategy<Value = SortItem> {
    (arb_column_id(), any::<bool>()).prop_map(|(field, ascending)| {
        if ascending {
            SortItem::asc(field)
        } else {
            SortItem::desc(field)
        }
    })
}

fn arb_filters() -> impl Strategy<Value = Map<String, Value>> {
    let key = prop_oneof![
        2 => prop::sample::select(vec!["q", "status", "min"]).prop_map(str::to_string),
        1 => "[a-z]{1,4}",
    ];
    let value = prop_oneof![
        2 => "[a-z ]{0,6}".prop_map(Value::from),
        1 => arb_json_value(),
    ];
    prop::collection::btree_map(key, value, 0..4).prop_map(|m| m.into_iter().collect())
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        prop::collection::vec(arb_sort_item(), 0..3).prop_map(Mutation::Sort),
        prop::collection::hash_map(arb_column_id(), any::<bool>(), 0..6)
            .prop_map(Mutation::Visibility),
        prop::collection::vec(arb_column_id(), 0..8).prop_map(Mutation::Order),
        prop_oneof![
            prop::sample::select(gridstate_core::PAGE_SIZES.to_vec()),
            any::<u32>(),
        ]
        .prop_map(Mutation::PageSize),
        prop::sample::select(vec![Density::Compact, Density::Standard, Density::Comfortable])
            .prop_map(Mutation::Density),
        arb_filters().prop_map(Mutation::Filters),
    ]
}

fn apply(controller: &ViewController, mutation: Mutation) -> gridstate_core::ViewSnapshot {
    match mutation {
        Mutation::Sort(sort) => controller.set_sort(sort),
        Mutation::Visibility(model) => controller.set_column_visibility(&model),
        Mutation::Order(order) => controller.set_column_order(order),
        Mutation::PageSize(size) => controller.set_page_size(size),
        Mutation::Density(density) => controller.set_density(density),
        Mutation::Filters(filters) => controller.set_filters(filters),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_mutations_keep_snapshot_and_url_consistent(
        mutations in prop::collection::vec(arb_mutation(), 1..8),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let spec = fixtures::sample_spec();
        let controller = runtime.block_on(ViewController::load(
            spec.clone(),
            fixtures::memory_store(),
            fixtures::sample_url("tab=2"),
            TokenCodec::default(),
        ));

        for mutation in mutations {
            let returned = apply(&controller, mutation);
            let snapshot = controller.snapshot();
            prop_assert_eq!(&returned, &snapshot);
            assert_sanitized(&snapshot, &spec.allowed_columns);

            let location = controller.location();
            prop_assert_eq!(location.param("tab"), Some("2".to_string()));

            let token = location.token().expect("mutations write a token");
            let decoded = TokenCodec::default()
                .deserialize(&token)
                .expect("own token must decode");
            prop_assert_eq!(sanitize(&decoded, &spec.allowed_columns), snapshot.clone());

            let expected_q = snapshot
                .filter_str("q")
                .filter(|q| !q.is_empty())
                .map(str::to_string);
            prop_assert_eq!(location.param("q"), expected_q);
        }
    }
}
