//! Run with:
//!   cargo bench --bench codec_benchmark

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use num_bigint::BigInt;
use wordint::{Int, ReservedRegion, TaggedInt};

fn bench_small(c: &mut Criterion) {
    // keep the one-time reservation out of the measurement
    let _ = ReservedRegion::global();

    c.bench_function("make_small + get", |b| {
        b.iter(|| {
            let v = TaggedInt::make_small(black_box(-12_345));
            black_box(v.get().0)
        })
    });

    let values: Vec<_> = (-512..512)
        .map(|x| TaggedInt::make_small(x * 4099))
        .collect();
    c.bench_function("get small x1024", |b| {
        b.iter(|| values.iter().map(|v| v.get().0).sum::<i64>())
    });
}

fn bench_big(c: &mut Criterion) {
    let _ = ReservedRegion::global();
    let big = BigInt::from(u64::MAX) * 7;

    c.bench_function("make_big + get", |b| {
        b.iter(|| {
            let v = TaggedInt::make_big(black_box(big.clone())).unwrap();
            black_box(v.get().1.is_some())
        })
    });
}

fn bench_int_add(c: &mut Criterion) {
    let a = Int::from(1_000_000);
    let b = Int::from(-77);
    c.bench_function("Int add small", |bench| {
        bench.iter(|| black_box(&a) + black_box(&b))
    });

    let x: Int = "123456789012345678901234567890".parse().unwrap();
    c.bench_function("Int add big", |bench| {
        bench.iter(|| black_box(&x) + black_box(&b))
    });
}

criterion_group!(benches, bench_small, bench_big, bench_int_add);
criterion_main!(benches);
