//! Result cache benchmarks.
//!
//! The cache sits on every inventory render; hits must stay cheap.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use opsdeck::core::cache::{CacheKey, ResultCache};
use opsdeck::core::clock::{Clock, SystemClock};

const TTL: Duration = Duration::from_secs(300);

fn bench_cache_hit(c: &mut Criterion) {
    let mut cache = ResultCache::new(Arc::new(SystemClock) as Arc<dyn Clock>);
    let key = CacheKey::new("cloud.instances", &["sandbox", "us-east-1"]);
    let payload: Vec<String> = (0..64).map(|i| format!("i-{:08x}", i)).collect();

    let seeded = payload.clone();
    let _: Vec<String> = cache
        .get_or_load(key.clone(), TTL, move || Ok(seeded))
        .unwrap();

    c.bench_function("cache_hit_64_rows", |b| {
        b.iter(|| {
            let value: Vec<String> = cache
                .get_or_load(black_box(key.clone()), TTL, || unreachable!("must hit"))
                .unwrap();
            black_box(value);
        })
    });
}

fn bench_cache_miss_and_store(c: &mut Criterion) {
    c.bench_function("cache_miss_and_store", |b| {
        b.iter(|| {
            let mut cache = ResultCache::new(Arc::new(SystemClock) as Arc<dyn Clock>);
            let value: Vec<u64> = cache
                .get_or_load(
                    CacheKey::new("cloud.instances", &["sandbox", "us-east-1"]),
                    TTL,
                    || Ok((0..64).collect()),
                )
                .unwrap();
            black_box(value);
        })
    });
}

fn bench_key_construction(c: &mut Criterion) {
    c.bench_function("cache_key_construction", |b| {
        b.iter(|| {
            black_box(CacheKey::new(
                black_box("cloud.instances"),
                black_box(&["production", "eu-west-1"]),
            ))
        })
    });
}

criterion_group!(
    benches,
    bench_cache_hit,
    bench_cache_miss_and_store,
    bench_key_construction
);
criterion_main!(benches);
