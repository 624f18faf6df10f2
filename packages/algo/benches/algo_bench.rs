//! Benchmark suite for elara-algo
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elara_algo::{build_profile, cluster, DiagnosticAnswer, DIAGNOSTIC_QUESTIONS};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_kmeans(c: &mut Criterion) {
    let items: Vec<[f64; 4]> = (0..200)
        .map(|i| {
            let x = i as f64;
            [x * 12.0, (i % 9) as f64, (i % 5) as f64, x.sin().abs()]
        })
        .collect();

    c.bench_function("kmeans k=3 n=200", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            cluster(black_box(&items), 3, &mut rng)
        })
    });
}

fn bench_build_profile(c: &mut Criterion) {
    let answers: Vec<DiagnosticAnswer> = DIAGNOSTIC_QUESTIONS
        .iter()
        .map(|q| DiagnosticAnswer::new(q.id, q.options[q.id as usize % 4]))
        .collect();

    c.bench_function("build_profile", |b| b.iter(|| build_profile(black_box(&answers))));
}

criterion_group!(benches, bench_kmeans, bench_build_profile);
criterion_main!(benches);
