//! Performance benchmarks for the resource cache.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use normcache::{KeySchema, MemoryTree, ResourceStore};
use serde_json::{json, Value};
use std::sync::Arc;

fn users_store() -> ResourceStore {
    ResourceStore::new(
        "https://api.example.com",
        Arc::new(KeySchema::new("users")),
        Arc::new(MemoryTree::new()),
    )
}

fn payload(len: u64) -> Vec<Value> {
    (0..len)
        .map(|i| json!({"id": i, "name": format!("user-{i}"), "meta": {"rank": i}}))
        .collect()
}

/// Benchmark collection ingest at varying payload sizes
fn bench_set_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_collection");

    for size in [10u64, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("records", size), &size, |b, &size| {
            let store = users_store();
            let data = payload(size);
            b.iter(|| {
                black_box(store.set_collection("/users", data.clone()).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark hydration reads against a populated store
fn bench_get_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_collection");

    for size in [10u64, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("records", size), &size, |b, &size| {
            let store = users_store();
            store.set_collection("/users", payload(size)).unwrap();
            b.iter(|| {
                black_box(store.get_collection("/users").unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark a delete/undo cycle with the model referenced by several
/// overlapping collections
fn bench_delete_undo(c: &mut Criterion) {
    let store = users_store();
    let data = payload(200);
    store.set_collection("/users", data.clone()).unwrap();
    store
        .set_collection("/users?page=1", data[..100].to_vec())
        .unwrap();
    store
        .set_collection("/users?page=2", data[100..].to_vec())
        .unwrap();

    c.bench_function("delete_model_then_undo", |b| {
        b.iter(|| {
            let undo = store.delete_model(50u64);
            store.apply_undo(black_box(undo));
        });
    });
}

criterion_group!(
    benches,
    bench_set_collection,
    bench_get_collection,
    bench_delete_undo
);
criterion_main!(benches);
