//! Benchmarks for json-salt
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use json_salt::digest::{CacheMode, DigestCache};
use json_salt::document::{self, KeyPath};
use serde_json::{json, Value};

fn sample_doc() -> json_salt::Document {
    match json!({
        "id": 42,
        "user": {"email": "someone@example.com", "name": "Someone", "tags": ["a", "b"]},
        "meta": {"source": "import"}
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn benchmark_path_write(c: &mut Criterion) {
    let path = KeyPath::parse("user.email", ".").unwrap();

    c.bench_function("path_write_nested", |b| {
        let mut doc = sample_doc();
        b.iter(|| {
            let previous = document::write(&mut doc, &path, Value::String("x".into())).unwrap();
            black_box(previous);
        })
    });
}

fn benchmark_digest_cache(c: &mut Criterion) {
    let values: Vec<String> = (0..64).map(|i| format!("user{}@example.com", i)).collect();

    c.bench_function("digest_cached", |b| {
        let cache = DigestCache::new("pepper", CacheMode::Cached);
        b.iter(|| {
            for v in &values {
                black_box(cache.get_or_compute(v));
            }
        })
    });

    c.bench_function("digest_brute_force", |b| {
        let cache = DigestCache::new("pepper", CacheMode::BruteForce);
        b.iter(|| {
            for v in &values {
                black_box(cache.get_or_compute(v));
            }
        })
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let doc = sample_doc();

    c.bench_function("encode_compact", |b| {
        b.iter(|| black_box(document::encode(&doc, document::OutputStyle::Compact).unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_path_write,
    benchmark_digest_cache,
    benchmark_encode
);
criterion_main!(benches);
