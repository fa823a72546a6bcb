// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;
use std::sync::Arc;
use waymark_ga::{
    config::EvolutionConfig, engine::EvolutionEngine, fitness::ClosedTourFitness,
    monitor::no_op::NoOperationMonitor,
};
use waymark_model::{
    costs::EdgeCostModel,
    index::CityIndex,
    mask::{ConnectionMask, SuccessorDomains},
    matrix::DistanceMatrix,
};

fn random_matrix(n: usize, seed: u64) -> Arc<DistanceMatrix<i64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let costs = (0..n * n)
        .map(|k| {
            if k / n == k % n {
                0
            } else {
                rng.random_range(1..1_000)
            }
        })
        .collect();
    Arc::new(DistanceMatrix::from_flat(n, costs))
}

/// Keeps roughly half of all transitions, like a mid-search frontier.
struct HalfOpenDomains {
    num_cities: usize,
}

impl SuccessorDomains for HalfOpenDomains {
    fn num_cities(&self) -> usize {
        self.num_cities
    }

    fn contains(&self, from: CityIndex, to: CityIndex) -> bool {
        from != to && (from.get() + to.get()) % 2 == 0
    }
}

fn bench_evolution_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolution_pass");
    group.sample_size(20);

    for &n in &[16usize, 48, 96] {
        let costs = EdgeCostModel::new(random_matrix(n, n as u64));
        let fitness = ClosedTourFitness::new(&costs);
        let generations = 100u64;

        group.throughput(Throughput::Elements(generations));
        group.bench_with_input(BenchmarkId::new("generations_100", n), &n, |b, _| {
            let mut engine =
                EvolutionEngine::new(EvolutionConfig::default(), ChaCha8Rng::seed_from_u64(1));
            b.iter(|| {
                let outcome = engine.run(black_box(&fitness), generations, NoOperationMonitor);
                black_box(outcome.best_fitness())
            })
        });
    }
    group.finish();
}

fn bench_mask_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_snapshot");

    for &n in &[16usize, 76, 200] {
        let domains = HalfOpenDomains { num_cities: n };
        let base = random_matrix(n, 7);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_with_input(BenchmarkId::new("from_domains", n), &n, |b, _| {
            b.iter(|| black_box(ConnectionMask::from_domains(black_box(&domains))))
        });

        let mask = ConnectionMask::from_domains(&domains);
        group.bench_with_input(BenchmarkId::new("restrict_costs", n), &n, |b, _| {
            b.iter(|| black_box(EdgeCostModel::restricted(Arc::clone(&base), black_box(&mask))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evolution_pass, bench_mask_snapshot);
criterion_main!(benches);
