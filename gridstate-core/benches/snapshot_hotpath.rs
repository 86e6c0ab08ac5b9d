use criterion::{criterion_group, criterion_main, Criterion};
use gridstate_core::{
    make_default, merge, sanitize, token, AllowedColumns, ColumnState, Density, SortItem,
    ViewDefaults,
};
use serde_json::json;
use std::hint::black_box;

fn wide_defaults(columns: usize) -> (ViewDefaults, AllowedColumns) {
    let ids: Vec<String> = (0..columns).map(|i| format!("col_{i}")).collect();
    let defaults = ViewDefaults {
        columns: Some(ColumnState::new(ids.iter().cloned())),
        sort: Some(vec![SortItem::asc("col_0"), SortItem::desc("col_1")]),
        page_size: Some(50),
        density: Some(Density::Compact),
        filters: None,
    };
    (defaults, AllowedColumns::new(ids))
}

fn bench_resolve(c: &mut Criterion) {
    let (defaults, allowed) = wide_defaults(200);
    let base = make_default(defaults).to_raw();
    let overlay = gridstate_core::RawSnapshot::new()
        .with("density", json!("comfortable"))
        .with("columns", json!({ "visible": ["col_3", "col_1", "gone"] }));

    c.bench_function("snapshot/merge_sanitize_200_cols", |b| {
        b.iter(|| {
            let merged = merge(black_box(&base), Some(black_box(&overlay)));
            black_box(sanitize(&merged, &allowed));
        });
    });
}

fn bench_token(c: &mut Criterion) {
    let (defaults, allowed) = wide_defaults(200);
    let snapshot = sanitize(&make_default(defaults).to_raw(), &allowed);

    c.bench_function("token/round_trip_200_cols", |b| {
        b.iter(|| {
            let encoded = token::serialize(black_box(&snapshot));
            black_box(token::deserialize(&encoded));
        });
    });
}

criterion_group!(benches, bench_resolve, bench_token);
criterion_main!(benches);
