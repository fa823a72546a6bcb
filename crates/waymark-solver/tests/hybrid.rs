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

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::{sync::Arc, time::Duration};
use waymark_bnb::monitor::frontier::FrontierSamplingConfig;
use waymark_ga::config::EvolutionConfig;
use waymark_model::{
    index::CityIndex,
    loading::MatrixLoader,
    matrix::DistanceMatrix,
    tour::is_permutation,
};
use waymark_search::result::TerminationReason;
use waymark_solver::{
    config::HybridConfig,
    solver::HybridSolver,
};

fn random_matrix(n: usize, seed: u64) -> DistanceMatrix<i64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = vec![0i64; n * n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                data[i * n + j] = rng.random_range(1..60);
            }
        }
    }
    DistanceMatrix::from_flat(n, data)
}

fn closed_cost(matrix: &DistanceMatrix<i64>, order: &[usize]) -> i64 {
    (0..order.len())
        .map(|k| {
            let from = CityIndex::new(order[k]);
            let to = CityIndex::new(order[(k + 1) % order.len()]);
            matrix.cost(from, to)
        })
        .sum()
}

fn brute_force(matrix: &DistanceMatrix<i64>) -> i64 {
    fn permute(
        matrix: &DistanceMatrix<i64>,
        order: &mut Vec<usize>,
        used: &mut [bool],
        best: &mut i64,
    ) {
        if order.len() == used.len() {
            *best = (*best).min(closed_cost(matrix, order));
            return;
        }
        for city in 1..used.len() {
            if !used[city] {
                used[city] = true;
                order.push(city);
                permute(matrix, order, used, best);
                order.pop();
                used[city] = false;
            }
        }
    }

    let n = matrix.num_cities();
    let mut used = vec![false; n];
    used[0] = true;
    let mut best = i64::MAX;
    permute(matrix, &mut vec![0], &mut used, &mut best);
    best
}

fn eager_config(seed: u64) -> HybridConfig {
    HybridConfig::default()
        .with_portfolio_size(4)
        .with_seed(Some(seed))
        .with_frontier(
            FrontierSamplingConfig::default()
                .with_warmup_solutions(0)
                .with_sample_interval(1),
        )
        .with_evolution(EvolutionConfig::default().with_population_size(20))
        .with_refiner_generations(30)
        .with_poll_interval(Duration::from_millis(2))
}

#[test]
fn test_hybrid_matches_brute_force() {
    for seed in 0..4 {
        let matrix = random_matrix(8, seed);
        let optimum = brute_force(&matrix);

        let solver = HybridSolver::new(Arc::new(matrix), eager_config(seed)).unwrap();
        let mut improvements = Vec::new();
        let outcome = solver.solve_with(|event| improvements.push(*event));

        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::OptimalityProven,
            "seed {seed}"
        );
        let tour = outcome.best_exact_tour().unwrap();
        assert_eq!(tour.objective_value(), optimum, "seed {seed}");
        assert!(is_permutation(tour.order()));
        assert_eq!(outcome.best_distance(), Some(optimum as f64));

        // Every sample publishes, and the very first step is a sample.
        assert!(outcome.masks_published() > 0);
        assert!(improvements.windows(2).all(|w| w[1].distance < w[0].distance));
        assert_eq!(
            improvements.last().map(|event| event.distance),
            Some(optimum as f64)
        );
    }
}

#[test]
fn test_refiner_tours_respect_base_costs() {
    let matrix = random_matrix(9, 17);
    let solver = HybridSolver::new(
        Arc::new(matrix.clone()),
        eager_config(17).with_max_refiner_passes(Some(3)),
    )
    .unwrap();
    let outcome = solver.solve();

    if let Some(tour) = outcome.refiner_tour() {
        let order: Vec<usize> = tour.order().iter().map(|c| c.get()).collect();
        assert!(is_permutation(tour.order()));
        assert_eq!(tour.objective_value(), closed_cost(&matrix, &order));
        assert!(tour.objective_value() as f64 >= outcome.best_distance().unwrap());
    }
    assert!(outcome.refiner_passes() <= 3);
}

#[test]
fn test_solves_a_loaded_matrix_file_format() {
    let text = "\
// four cities on a square
{0, 1, 2, 1}
{1, 0, 1, 2}

{2, 1, 0, 1}
{1, 2, 1, 0}
";
    let matrix = MatrixLoader::new().from_str::<i64>(text).unwrap();
    let solver = HybridSolver::new(
        Arc::new(matrix),
        HybridConfig::default()
            .with_seed(Some(1))
            .with_refiner_generations(10),
    )
    .unwrap();
    let outcome = solver.solve();

    assert!(outcome.exact().is_optimal());
    assert_eq!(outcome.best_exact_tour().unwrap().objective_value(), 4);
    assert_eq!(outcome.best_distance(), Some(4.0));
}
