//! Throughput Benchmark for HashKV
//!
//! This benchmark measures the store and codec under various workloads.
//! With a fixed bucket count, lookups slow down linearly as the store grows;
//! the `get` group shows this directly.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hashkv::protocol::{encode_request, parse_request, Reply};
use hashkv::storage::{Store, Value};
use std::sync::Arc;
use std::time::Duration;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_new_keys", |b| {
        let store = Store::new();
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i % 10_000));
            store.set(key, Value::from("small_value"));
            i += 1;
        });
    });

    group.bench_function("set_overwrite", |b| {
        let store = Store::new();
        let key = Bytes::from("key");
        b.iter(|| {
            store.set(key.clone(), Value::from("value"));
        });
    });

    group.finish();
}

/// Benchmark GET operations at increasing load
fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    for size in [100usize, 1_000, 10_000] {
        let store = Store::new();
        for i in 0..size {
            store.set(
                Bytes::from(format!("key:{}", i)),
                Value::from(format!("value:{}", i)),
            );
        }

        group.bench_with_input(BenchmarkId::new("get_existing", size), &size, |b, &size| {
            let mut i = 0usize;
            b.iter(|| {
                let key = format!("key:{}", i % size);
                black_box(store.get(key.as_bytes()));
                i += 1;
            });
        });

        group.bench_with_input(BenchmarkId::new("get_missing", size), &size, |b, _| {
            let mut i = 0u64;
            b.iter(|| {
                let key = format!("missing:{}", i);
                black_box(store.get(key.as_bytes()));
                i += 1;
            });
        });
    }

    group.finish();
}

/// Benchmark mixed workload (80% reads, 20% writes)
fn bench_mixed(c: &mut Criterion) {
    let store = Arc::new(Store::new());

    // Pre-populate
    for i in 0..1_000 {
        store.set(
            Bytes::from(format!("key:{}", i)),
            Value::from(format!("value:{}", i)),
        );
    }

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    group.bench_function("80_read_20_write", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 1_000);
            if i % 5 == 0 {
                // 20% writes
                store.set(Bytes::from(key), Value::from("value"));
            } else {
                // 80% reads
                black_box(store.get(key.as_bytes()));
            }
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark concurrent access through the single lock
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let store = Arc::new(Store::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..2_000 {
                            let key = Bytes::from(format!("key:{}:{}", t, i));
                            store.set(key.clone(), Value::from("value"));
                            store.get(&key);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(store.len());
        });
    });

    group.finish();
}

/// Benchmark full enumeration
fn bench_keys(c: &mut Criterion) {
    let store = Store::new();
    for i in 0..10_000 {
        store.set(Bytes::from(format!("user:{}", i)), Value::from("user_data"));
    }

    let mut group = c.benchmark_group("keys");

    group.bench_function("keys_all", |b| {
        b.iter(|| {
            black_box(store.keys());
        });
    });

    group.finish();
}

/// Benchmark request parsing and reply serialization
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let frame = Bytes::from(encode_request(&["set", "user:101", "Ariz"]).unwrap());
    group.bench_function("parse_set_request", |b| {
        b.iter(|| {
            black_box(parse_request(frame.slice(4..)).unwrap());
        });
    });

    let reply = Reply::array((0..100).map(|i| Bytes::from(format!("key:{}", i))).collect());
    group.bench_function("serialize_keys_reply", |b| {
        b.iter(|| {
            black_box(reply.to_frame());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_mixed,
    bench_concurrent,
    bench_keys,
    bench_codec,
);

criterion_main!(benches);
