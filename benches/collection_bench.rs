//! MOTORPOOL - Performance Benchmarks
//! Measures throughput of core registry operations using Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use motorpool::collection::CollectionStore;
use motorpool::config::Config;
use motorpool::session::Session;
use motorpool::storage::file::FileStore;
use motorpool::types::VehicleDraft;

fn filled(size: usize, session: &Session) -> CollectionStore {
    let mut store = CollectionStore::new();
    for i in 0..size {
        let draft = VehicleDraft::new(format!("vehicle_{:06}", i), 10, 20, (i % 500 + 1) as f32);
        store.add(draft, session).unwrap();
    }
    store
}

fn bench_collection_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection");
    let alice = Session::logged_in("alice");

    group.bench_function("add_1000", |b| {
        b.iter(|| black_box(filled(1000, &alice)));
    });

    // Removing the first id renumbers every remaining vehicle
    group.bench_function("remove_first_reindex", |b| {
        b.iter_batched(
            || filled(1000, &alice),
            |mut store| {
                black_box(store.remove_by_id(1, &alice).unwrap());
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("bulk_remove_greater", |b| {
        b.iter_batched(
            || filled(1000, &alice),
            |mut store| {
                black_box(
                    store
                        .remove_where_engine_power_greater_than(250.0, &alice)
                        .unwrap(),
                );
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function("sort_by_power", |b| {
        let store = filled(1000, &alice);
        b.iter(|| {
            black_box(store.filter_and_sort(
                |_| true,
                |a, b| a.engine_power.total_cmp(&b.engine_power),
            ))
        });
    });

    group.finish();
}

fn bench_file_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_store");
    let alice = Session::logged_in("alice");

    for size in [100, 500, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("save_load_cycle", size), size, |b, &size| {
            let store = filled(size, &alice);
            b.iter(|| {
                let dir = tempfile::tempdir().unwrap();
                let config = Config::new(dir.path()).with_sync_writes(false);
                let mut backend = FileStore::open(&config).unwrap();

                store.save(&mut backend).unwrap();
                black_box(CollectionStore::load(&mut backend).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_collection_operations, bench_file_store);
criterion_main!(benches);
