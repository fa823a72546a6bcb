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

//! The mask-restricted evolutionary refiner.
//!
//! A long-lived loop that waits for the exact search to publish a
//! `ConnectionMask`, prices every transition the mask disallows at the
//! sentinel, and runs one generation-bounded evolutionary pass over that
//! restricted cost model, reporting each generation's best fitness to the
//! shared coordination state. It then starts over with whatever mask is
//! current. The stop flag is checked between passes only; a running pass
//! always finishes its generation budget.

use crate::{
    config::EvolutionConfig,
    engine::EvolutionEngine,
    fitness::{ClosedTourFitness, INFEASIBLE_FITNESS},
    monitor::{
        composite::CompositeEvolutionMonitor, coordination::CoordinationReportingMonitor,
        log::LogEvolutionMonitor,
    },
};
use num_traits::{PrimInt, Signed};
use rand::Rng;
use std::sync::Arc;
use waymark_model::{costs::EdgeCostModel, matrix::DistanceMatrix, tour::Tour};
use waymark_search::coordination::SharedCoordinationState;

/// Generations per refiner pass unless configured otherwise.
pub const DEFAULT_GENERATIONS_PER_PASS: u64 = 10_000;

/// What a refiner run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinerSummary<T> {
    passes: u64,
    best_fitness: f64,
    best_tour: Option<Tour<T>>,
    accepted_reports: u64,
}

impl<T> RefinerSummary<T>
where
    T: PrimInt + Signed,
{
    fn new() -> Self {
        Self {
            passes: 0,
            best_fitness: INFEASIBLE_FITNESS,
            best_tour: None,
            accepted_reports: 0,
        }
    }

    /// Number of completed passes.
    #[inline]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Best fitness over all passes, `INFEASIBLE_FITNESS` if none was feasible.
    #[inline]
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Best feasible tour over all passes.
    #[inline]
    pub fn best_tour(&self) -> Option<&Tour<T>> {
        self.best_tour.as_ref()
    }

    #[inline]
    pub fn into_best_tour(self) -> Option<Tour<T>> {
        self.best_tour
    }

    /// Number of generation reports that tightened the shared distance.
    #[inline]
    pub fn accepted_reports(&self) -> u64 {
        self.accepted_reports
    }
}

/// Runs evolutionary passes restricted by the latest published mask.
#[derive(Debug)]
pub struct EvolutionaryRefiner<T, R>
where
    T: PrimInt + Signed,
{
    base: Arc<DistanceMatrix<T>>,
    coordination: Arc<SharedCoordinationState>,
    engine: EvolutionEngine<R>,
    generations_per_pass: u64,
    max_passes: Option<u64>,
    log_interval: Option<u64>,
}

impl<T, R> EvolutionaryRefiner<T, R>
where
    T: PrimInt + Signed + std::fmt::Display,
    R: Rng,
{
    /// Creates a refiner over the base matrix.
    ///
    /// # Panics
    ///
    /// Panics if `config` does not validate.
    pub fn new(
        base: Arc<DistanceMatrix<T>>,
        coordination: Arc<SharedCoordinationState>,
        config: EvolutionConfig,
        rng: R,
    ) -> Self {
        Self {
            base,
            coordination,
            engine: EvolutionEngine::new(config, rng),
            generations_per_pass: DEFAULT_GENERATIONS_PER_PASS,
            max_passes: None,
            log_interval: None,
        }
    }

    #[inline]
    pub fn with_generations_per_pass(mut self, generations_per_pass: u64) -> Self {
        self.generations_per_pass = generations_per_pass;
        self
    }

    /// Stops after this many passes even if no stop was requested.
    #[inline]
    pub fn with_max_passes(mut self, max_passes: Option<u64>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Logs pass progress every `interval` generations.
    #[inline]
    pub fn with_log_interval(mut self, interval: Option<u64>) -> Self {
        self.log_interval = interval;
        self
    }

    #[inline]
    pub fn generations_per_pass(&self) -> u64 {
        self.generations_per_pass
    }

    /// Runs passes until a stop is requested or the pass limit is reached.
    pub fn run(&mut self) -> RefinerSummary<T> {
        let mut summary = RefinerSummary::new();
        tracing::info!(
            generations_per_pass = self.generations_per_pass,
            "evolutionary refiner started"
        );

        loop {
            if self.coordination.stop_requested() {
                break;
            }
            if self.max_passes.is_some_and(|max| summary.passes >= max) {
                break;
            }

            // None only if the stop arrived before any mask did.
            let Some(mask) = self.coordination.await_mask() else {
                break;
            };

            let costs = EdgeCostModel::restricted(Arc::clone(&self.base), &mask);
            if let Some(city) = mask.first_dead_end() {
                tracing::debug!(
                    city = city.get(),
                    "mask leaves a city without successors; every tour is infeasible"
                );
            }
            let fitness = ClosedTourFitness::new(&costs);

            let mut reporter = CoordinationReportingMonitor::new(Arc::clone(&self.coordination));
            let mut monitor = CompositeEvolutionMonitor::with_capacity(2);
            monitor.add_monitor(&mut reporter);
            if let Some(interval) = self.log_interval.filter(|&i| i > 0) {
                monitor.add_monitor(LogEvolutionMonitor::new(interval));
            }

            let outcome = self
                .engine
                .run(&fitness, self.generations_per_pass, monitor);

            summary.passes += 1;
            summary.accepted_reports += reporter.accepted();
            if outcome.best_fitness() < summary.best_fitness {
                summary.best_fitness = outcome.best_fitness();
                summary.best_tour = outcome.tour().cloned();
            }

            tracing::debug!(
                pass = summary.passes,
                forbidden = costs.num_forbidden(),
                best = outcome.best_fitness(),
                accepted = reporter.accepted(),
                "refiner pass finished"
            );
        }

        tracing::info!(
            passes = summary.passes,
            best = ?summary.best_tour.as_ref().map(|t| t.objective_value().to_string()),
            "evolutionary refiner stopped"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::{Duration, Instant};
    use waymark_model::{index::CityIndex, mask::ConnectionMask};

    fn c(i: usize) -> CityIndex {
        CityIndex::new(i)
    }

    fn matrix() -> Arc<DistanceMatrix<i64>> {
        Arc::new(DistanceMatrix::from_rows(&[
            vec![0, 3, 4, 2, 7],
            vec![3, 0, 4, 6, 3],
            vec![4, 4, 0, 5, 8],
            vec![2, 6, 5, 0, 6],
            vec![7, 3, 8, 6, 0],
        ]))
    }

    fn refiner(
        coordination: &Arc<SharedCoordinationState>,
        seed: u64,
    ) -> EvolutionaryRefiner<i64, ChaCha8Rng> {
        EvolutionaryRefiner::new(
            matrix(),
            Arc::clone(coordination),
            EvolutionConfig::default(),
            ChaCha8Rng::seed_from_u64(seed),
        )
        .with_generations_per_pass(20)
    }

    #[test]
    fn test_pass_limit_and_reporting() {
        let coordination = Arc::new(SharedCoordinationState::new());
        coordination.publish_mask(ConnectionMask::new(5));

        let summary = refiner(&coordination, 1).with_max_passes(Some(2)).run();

        assert_eq!(summary.passes(), 2);
        let tour = summary.best_tour().expect("feasible tour");
        assert_eq!(tour.objective_value() as f64, summary.best_fitness());
        // The initial population is never reported, only generations are.
        assert!(coordination.current_best_distance() >= summary.best_fitness());
        assert!(coordination.has_distance());
        assert!(summary.accepted_reports() >= 1);
    }

    #[test]
    fn test_stop_before_mask_returns_immediately() {
        let coordination = Arc::new(SharedCoordinationState::new());
        coordination.request_stop();

        let summary = refiner(&coordination, 2).run();
        assert_eq!(summary.passes(), 0);
        assert!(summary.best_tour().is_none());
        assert!(!coordination.has_distance());
    }

    #[test]
    fn test_restricted_pass_respects_mask() {
        let coordination = Arc::new(SharedCoordinationState::new());
        let mut mask = ConnectionMask::new(5);
        for to in 2..5 {
            mask.set_transition(c(0), c(to), false).expect("in range");
        }
        coordination.publish_mask(mask);

        let summary = refiner(&coordination, 3).with_max_passes(Some(1)).run();
        if let Some(tour) = summary.best_tour() {
            assert_eq!(tour.successor_of(c(0)), Some(c(1)));
        } else {
            assert_eq!(summary.best_fitness(), INFEASIBLE_FITNESS);
        }
    }

    #[test]
    fn test_waits_for_late_mask_and_observes_stop() {
        let coordination = Arc::new(SharedCoordinationState::new());

        let summary = std::thread::scope(|scope| {
            let handle = scope.spawn(|| refiner(&coordination, 4).run());

            std::thread::sleep(Duration::from_millis(20));
            assert!(!coordination.has_distance());
            coordination.publish_mask(ConnectionMask::new(5));

            let deadline = Instant::now() + Duration::from_secs(10);
            while !coordination.has_distance() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(1));
            }
            coordination.request_stop();
            handle.join().expect("refiner thread")
        });

        assert!(summary.passes() >= 1);
        assert!(coordination.has_distance());
    }
}
