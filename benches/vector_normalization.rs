//! Spring normalization benchmarks
//!
//! Compares the per-spring branching kernel against the batch-of-4 masked
//! kernel the solver uses, on a random spring soup with some zero-length
//! springs mixed in.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use ship_sandbox::sim::ElementIndex;
use ship_sandbox::sim::vectorization::{normalize_springs, normalize_springs_naive};

struct SpringSoup {
    positions: Vec<Vec2>,
    endpoint_a: Vec<ElementIndex>,
    endpoint_b: Vec<ElementIndex>,
}

fn spring_soup(spring_count: usize) -> SpringSoup {
    let mut rng = Pcg32::seed_from_u64(7);
    let point_count = spring_count / 2 + 1;
    let positions = (0..point_count)
        .map(|_| Vec2::new(rng.random_range(-100.0..100.0), rng.random_range(-100.0..100.0)))
        .collect();
    let mut endpoint_a = Vec::with_capacity(spring_count);
    let mut endpoint_b = Vec::with_capacity(spring_count);
    for s in 0..spring_count {
        let a = rng.random_range(0..point_count) as ElementIndex;
        // Every 16th spring is degenerate
        let b = if s % 16 == 0 { a } else { rng.random_range(0..point_count) as ElementIndex };
        endpoint_a.push(a);
        endpoint_b.push(b);
    }
    SpringSoup {
        positions,
        endpoint_a,
        endpoint_b,
    }
}

fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring_normalization");
    for spring_count in [1_000usize, 10_000, 100_000] {
        let soup = spring_soup(spring_count);
        let mut directions = vec![Vec2::ZERO; spring_count];
        let mut lengths = vec![0.0f32; spring_count];

        group.bench_with_input(BenchmarkId::new("naive", spring_count), &soup, |b, soup| {
            b.iter(|| {
                normalize_springs_naive(
                    black_box(&soup.positions),
                    &soup.endpoint_a,
                    &soup.endpoint_b,
                    &mut directions,
                    &mut lengths,
                )
            })
        });

        group.bench_with_input(BenchmarkId::new("batched", spring_count), &soup, |b, soup| {
            b.iter(|| {
                normalize_springs(
                    black_box(&soup.positions),
                    &soup.endpoint_a,
                    &soup.endpoint_b,
                    &mut directions,
                    &mut lengths,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalization);
criterion_main!(benches);
