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

//! The hybrid orchestrator.
//!
//! A `HybridSolver` runs the exact search portfolio and the evolutionary
//! refiner side by side. Both report distances to one
//! `SharedCoordinationState`; the exact workers additionally publish their
//! search frontier as connection masks that restrict the refiner's passes.
//!
//! Shutdown order matters: the refiner only observes a stop between passes
//! and may be parked waiting for its first mask, so the stop is requested
//! before the refiner is joined.

use crate::{
    config::{ConfigError, HybridConfig},
    coordinator::{ExactSearchCoordinator, PortfolioEvent, PortfolioRun},
};
use num_traits::ToPrimitive;
use rand::{SeedableRng, rngs::StdRng};
use std::{
    ops::ControlFlow,
    sync::Arc,
    time::{Duration, Instant},
};
use waymark_ga::refiner::{EvolutionaryRefiner, RefinerSummary};
use waymark_model::{matrix::DistanceMatrix, tour::Tour};
use waymark_search::{
    coordination::{SharedCoordinationState, UNBOUNDED_DISTANCE},
    num::SolverNumeric,
    portfolio::PortfolioSolverResult,
    result::{SolverOutcome, SolverResult, TerminationReason},
    stats::{SolverStatistics, SolverStatisticsBuilder},
};

/// Which side of the hybrid produced an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImprovementSource {
    Exact,
    Evolutionary,
}

impl std::fmt::Display for ImprovementSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImprovementSource::Exact => write!(f, "exact"),
            ImprovementSource::Evolutionary => write!(f, "evolutionary"),
        }
    }
}

/// A new best distance, as handed to the improvement callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImprovementEvent {
    pub distance: f64,
    pub source: ImprovementSource,
    /// Time since the solve started.
    pub elapsed: Duration,
}

/// The result of a hybrid solve.
#[derive(Debug, Clone)]
pub struct HybridOutcome<T> {
    exact: SolverOutcome<T>,
    best_distance: Option<f64>,
    refiner: Option<RefinerSummary<T>>,
}

impl<T> HybridOutcome<T>
where
    T: SolverNumeric,
{
    /// The outcome of the exact portfolio.
    #[inline]
    pub fn exact(&self) -> &SolverOutcome<T> {
        &self.exact
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        self.exact.result()
    }

    /// The best tour found by the exact portfolio, if any.
    #[inline]
    pub fn best_exact_tour(&self) -> Option<&Tour<T>> {
        self.exact.result().tour()
    }

    /// The best distance reported by either side, if any was accepted.
    #[inline]
    pub fn best_distance(&self) -> Option<f64> {
        self.best_distance
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        self.exact.reason()
    }

    #[inline]
    pub fn statistics(&self) -> &SolverStatistics {
        self.exact.statistics()
    }

    #[inline]
    pub fn masks_published(&self) -> u64 {
        self.exact.statistics().masks_published
    }

    #[inline]
    pub fn refiner_passes(&self) -> u64 {
        self.exact.statistics().refiner_passes
    }

    /// The best feasible tour of the refiner, if it ran and found one.
    #[inline]
    pub fn refiner_tour(&self) -> Option<&Tour<T>> {
        self.refiner.as_ref().and_then(|summary| summary.best_tour())
    }

    #[inline]
    pub fn refiner_summary(&self) -> Option<&RefinerSummary<T>> {
        self.refiner.as_ref()
    }
}

impl<T> std::fmt::Display for HybridOutcome<T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.best_distance {
            Some(distance) => writeln!(f, "Best Distance: {}", distance)?,
            None => writeln!(f, "Best Distance: none")?,
        }
        write!(f, "{}", self.exact)
    }
}

/// Runs the exact portfolio and the evolutionary refiner against one
/// coordination state.
#[derive(Debug, Clone)]
pub struct HybridSolver<T> {
    matrix: Arc<DistanceMatrix<T>>,
    config: HybridConfig,
}

impl<T> HybridSolver<T>
where
    T: SolverNumeric,
{
    /// Creates a solver after validating `config`.
    ///
    /// # Panics
    ///
    /// Panics if the matrix has fewer than two cities.
    pub fn new(matrix: Arc<DistanceMatrix<T>>, config: HybridConfig) -> Result<Self, ConfigError> {
        assert!(
            matrix.num_cities() >= 2,
            "called `HybridSolver::new` with a matrix of {} cities",
            matrix.num_cities()
        );
        config.validate()?;
        Ok(Self { matrix, config })
    }

    #[inline]
    pub fn config(&self) -> &HybridConfig {
        &self.config
    }

    #[inline]
    pub fn matrix(&self) -> &Arc<DistanceMatrix<T>> {
        &self.matrix
    }

    /// Solves with a fresh coordination state and no callback.
    pub fn solve(&self) -> HybridOutcome<T> {
        self.solve_with(|_| {})
    }

    /// Solves with a fresh coordination state, reporting every improvement.
    pub fn solve_with<F>(&self, on_improvement: F) -> HybridOutcome<T>
    where
        F: FnMut(&ImprovementEvent),
    {
        self.solve_in(Arc::new(SharedCoordinationState::new()), on_improvement)
    }

    /// Solves against a caller-provided coordination state.
    ///
    /// A distance already accepted by `coordination` becomes the ceiling of
    /// every exact worker. Requesting a stop on it from another thread raises
    /// the portfolio stop flag at the next poll.
    pub fn solve_in<F>(
        &self,
        coordination: Arc<SharedCoordinationState>,
        mut on_improvement: F,
    ) -> HybridOutcome<T>
    where
        F: FnMut(&ImprovementEvent),
    {
        let start_time = Instant::now();
        let config = &self.config;
        let base_seed = config.seed.unwrap_or_else(rand::random);

        tracing::info!(
            num_cities = self.matrix.num_cities(),
            portfolio_size = config.portfolio_size,
            refiner = config.refiner_enabled,
            seed = base_seed,
            "hybrid solve started"
        );

        let mut coordinator = ExactSearchCoordinator::with_default_portfolio(
            Arc::clone(&self.matrix),
            Arc::clone(&coordination),
            config.portfolio_size,
            config.frontier,
            base_seed,
            config.search_log_interval(),
        )
        .with_solution_limit(config.solution_limit)
        .with_time_limit(config.time_limit());

        let mut refiner = config.refiner_enabled.then(|| {
            EvolutionaryRefiner::new(
                Arc::clone(&self.matrix),
                Arc::clone(&coordination),
                config.evolution,
                StdRng::seed_from_u64(base_seed),
            )
            .with_generations_per_pass(config.refiner_generations)
            .with_max_passes(config.max_refiner_passes)
            .with_log_interval(config.evolution_log_interval)
        });

        let deadline = config.time_limit().map(|limit| start_time + limit);
        let mut tracker = ImprovementTracker::new(start_time);

        let (run, summary) = std::thread::scope(|scope| {
            let refiner_handle = refiner
                .as_mut()
                .map(|refiner| scope.spawn(move || refiner.run()));

            let run = coordinator.run(config.poll_interval(), |event| {
                if let Some(event) = event {
                    tracker.on_event(&coordination, event);
                }
                tracker.poll(&coordination, &mut on_improvement);

                let expired = deadline.is_some_and(|deadline| Instant::now() >= deadline);
                if coordination.stop_requested() || expired {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            });

            coordination.request_stop();
            let summary = refiner_handle.map(|handle| match handle.join() {
                Ok(summary) => summary,
                Err(payload) => std::panic::resume_unwind(payload),
            });
            (run, summary)
        });

        // The refiner may have improved during its final pass.
        tracker.poll(&coordination, &mut on_improvement);

        let exact = self.construct_outcome(start_time, &run, &coordination, summary.as_ref());
        let best_distance = coordination
            .has_distance()
            .then(|| coordination.current_best_distance());

        tracing::info!(
            result = %exact.result(),
            best_distance = ?best_distance,
            duration_ms = start_time.elapsed().as_millis() as u64,
            "hybrid solve finished"
        );

        HybridOutcome {
            exact,
            best_distance,
            refiner: summary,
        }
    }

    fn find_best_solution(&self, run: &PortfolioRun<T>) -> Option<Tour<T>> {
        run.results
            .iter()
            .filter_map(|r| r.result().tour())
            .chain(run.incumbent.as_ref())
            .min_by_key(|tour| tour.objective_value())
            .cloned()
    }

    fn build_statistics(
        &self,
        start_time: Instant,
        run: &PortfolioRun<T>,
        coordination: &SharedCoordinationState,
        summary: Option<&RefinerSummary<T>>,
    ) -> SolverStatistics {
        SolverStatisticsBuilder::new()
            .solutions_found(run.solutions_found)
            .used_threads(run.results.len() + usize::from(summary.is_some()))
            .masks_published(coordination.masks_published())
            .refiner_passes(summary.map_or(0, |s| s.passes()))
            .solve_duration(start_time.elapsed())
            .build()
    }

    fn construct_outcome(
        &self,
        start_time: Instant,
        run: &PortfolioRun<T>,
        coordination: &SharedCoordinationState,
        summary: Option<&RefinerSummary<T>>,
    ) -> SolverOutcome<T> {
        let stats = self.build_statistics(start_time, run, coordination, summary);

        // Optimality > Feasible > Infeasibility > Unknown
        if let Some(best) = self.find_best_solution(run) {
            if run.optimality_proven() {
                return SolverOutcome::optimal(best, stats);
            }
            let reason = self.determine_abort_reason(run);
            return SolverOutcome::feasible(best, reason, stats);
        }

        if run
            .results
            .iter()
            .any(|r| matches!(r.result(), SolverResult::Infeasible))
        {
            return SolverOutcome::infeasible(stats);
        }

        let reason = self.determine_abort_reason(run);
        SolverOutcome::unknown(reason, stats)
    }

    fn determine_abort_reason(&self, run: &PortfolioRun<T>) -> String {
        if let Some(msg) = run.results.iter().find_map(aborted_message) {
            return msg;
        }
        if run.stopped {
            return "external interrupt".to_string();
        }
        "search space exhausted without proof".to_string()
    }
}

fn aborted_message<T>(result: &PortfolioSolverResult<T>) -> Option<String>
where
    T: SolverNumeric,
{
    match result.termination_reason() {
        TerminationReason::Aborted(msg) => Some(msg.clone()),
        _ => None,
    }
}

/// Reports exact objectives and attributes improvements to their source.
///
/// Acceptance is strictly decreasing, so the polled best distance came from
/// the exact side exactly when it equals the last accepted exact report.
#[derive(Debug)]
struct ImprovementTracker {
    start_time: Instant,
    last_exact: Option<f64>,
    last_notified: f64,
}

impl ImprovementTracker {
    fn new(start_time: Instant) -> Self {
        Self {
            start_time,
            last_exact: None,
            last_notified: UNBOUNDED_DISTANCE,
        }
    }

    fn on_event<T>(&mut self, coordination: &SharedCoordinationState, event: &PortfolioEvent<T>)
    where
        T: SolverNumeric,
    {
        let objective = match event {
            PortfolioEvent::SolutionFound { objective, .. } => Some(*objective),
            PortfolioEvent::WorkerFinished { result, .. } => {
                result.result().tour().map(|tour| tour.objective_value())
            }
        };
        let Some(distance) = objective.and_then(|objective| objective.to_f64()) else {
            return;
        };
        if coordination.report_distance(distance) {
            self.last_exact = Some(distance);
        }
    }

    fn poll<F>(&mut self, coordination: &SharedCoordinationState, on_improvement: &mut F)
    where
        F: FnMut(&ImprovementEvent),
    {
        if !coordination.take_improvement() {
            return;
        }
        // A poll can observe a distance whose flag is only raised afterwards.
        let distance = coordination.current_best_distance();
        if distance >= self.last_notified {
            return;
        }
        self.last_notified = distance;
        let source = if self.last_exact == Some(distance) {
            ImprovementSource::Exact
        } else {
            ImprovementSource::Evolutionary
        };
        tracing::info!(distance, %source, "best distance improved");
        on_improvement(&ImprovementEvent {
            distance,
            source,
            elapsed: self.start_time.elapsed(),
        });
    }
}

/// Builder for `HybridSolver`.
#[derive(Debug, Clone)]
pub struct HybridSolverBuilder<T> {
    matrix: Arc<DistanceMatrix<T>>,
    config: HybridConfig,
}

impl<T> HybridSolverBuilder<T>
where
    T: SolverNumeric,
{
    #[inline]
    pub fn new(matrix: Arc<DistanceMatrix<T>>) -> Self {
        Self {
            matrix,
            config: HybridConfig::default(),
        }
    }

    #[inline]
    pub fn with_config(mut self, config: HybridConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn with_portfolio_size(mut self, portfolio_size: usize) -> Self {
        self.config = self.config.with_portfolio_size(portfolio_size);
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config = self.config.with_seed(Some(seed));
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.config = self.config.with_time_limit(Some(time_limit));
        self
    }

    #[inline]
    pub fn with_solution_limit(mut self, solution_limit: u64) -> Self {
        self.config = self.config.with_solution_limit(Some(solution_limit));
        self
    }

    #[inline]
    pub fn without_refiner(mut self) -> Self {
        self.config = self.config.with_refiner_enabled(false);
        self
    }

    #[inline]
    pub fn build(self) -> Result<HybridSolver<T>, ConfigError> {
        HybridSolver::new(self.matrix, self.config)
    }
}
