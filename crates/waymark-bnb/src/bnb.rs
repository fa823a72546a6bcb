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

//! Branch and bound over successor domains.
//!
//! `BnbSolver` explores tours as paths grown from city 0. Every node fixes
//! the successor of the current tail, propagates all-different and
//! single-circuit removals through the successor domains, and prunes the
//! node if an open city ran out of successors or if the objective plus the
//! sum of the cheapest remaining transition of every open city reaches the
//! best known tour. The best known tour starts at the model ceiling (strict)
//! and tightens with the solver's own tours and an optional shared
//! incumbent.
//!
//! The solver owns reusable trail and stack buffers. A search session object
//! holds the per-run state, statistics and timing; state is mutated in place
//! and restored through the trail, and both buffers are reset after each
//! run while keeping their capacity.

use crate::{
    branching::decision::{Decision, DecisionBuilder},
    incumbent::{IncumbentStore, NoSharedIncumbent, SharedIncumbentAdapter},
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    result::{BnbSolverOutcome, BnbTerminationReason},
    stack::SearchStack,
    state::SearchState,
    stats::BnbSolverStatistics,
    trail::SearchTrail,
};
use num_traits::{PrimInt, Signed};
use waymark_model::{index::CityIndex, model::Model, tour::Tour};
use waymark_search::{
    incumbent::SharedIncumbent, monitor::search_monitor::SearchCommand, num::SolverNumeric,
};

/// A branch and bound solver for the TSP.
///
/// This is only the execution engine; the order in which successors are
/// tried is delegated to a `DecisionBuilder`.
#[derive(Clone, Debug)]
pub struct BnbSolver<T>
where
    T: PrimInt + Signed,
{
    trail: SearchTrail<T>,
    stack: SearchStack<T>,
}

impl<T> Default for BnbSolver<T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BnbSolver<T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            trail: SearchTrail::new(),
            stack: SearchStack::new(),
        }
    }

    /// Creates a solver with buffers sized for `num_cities`.
    ///
    /// The solver grows its buffers on demand anyway; preallocation only
    /// moves the allocation to construction time.
    #[inline]
    pub fn preallocated(num_cities: usize) -> Self {
        Self {
            trail: SearchTrail::preallocated(num_cities),
            stack: SearchStack::preallocated(num_cities),
        }
    }

    /// Solves `model` in isolation.
    #[inline]
    pub fn solve<B, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        monitor: S,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        self.solve_internal(model, builder, monitor, NoSharedIncumbent::new())
    }

    /// Solves `model` while sharing bounds and tours through `incumbent`.
    #[inline]
    pub fn solve_with_incumbent<B, S>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        monitor: S,
        incumbent: &SharedIncumbent<T>,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
        T: SolverNumeric,
    {
        self.solve_internal(
            model,
            builder,
            monitor,
            SharedIncumbentAdapter::new(incumbent),
        )
    }

    fn solve_internal<B, S, I>(
        &mut self,
        model: &Model<T>,
        builder: &mut B,
        mut monitor: S,
        incumbent: I,
    ) -> BnbSolverOutcome<T>
    where
        B: DecisionBuilder<T>,
        S: TreeSearchMonitor<T>,
        I: IncumbentStore<T>,
        T: SolverNumeric,
    {
        let session = BnbSolverSearchSession::new(self, model, builder, &mut monitor, incumbent);
        let outcome = session.run();
        self.reset();
        outcome
    }

    /// Clears the trail and the stack, keeping their capacity.
    #[inline]
    fn reset(&mut self) {
        self.trail.reset();
        self.stack.reset();
    }
}

/// A single search run.
struct BnbSolverSearchSession<'a, T, B, S, I>
where
    T: SolverNumeric,
    I: IncumbentStore<T>,
{
    solver: &'a mut BnbSolver<T>,
    model: &'a Model<T>,
    builder: &'a mut B,
    monitor: &'a mut S,
    incumbent: I,
    state: SearchState<T>,
    best_objective: T,
    best_tour: Option<Tour<T>>,
    stats: BnbSolverStatistics,
    start_time: std::time::Instant,
}

impl<'a, T, B, S, I> std::fmt::Debug for BnbSolverSearchSession<'a, T, B, S, I>
where
    T: SolverNumeric,
    I: IncumbentStore<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("state", &self.state)
            .field("best_objective", &self.best_objective)
            .field("best_tour", &self.best_tour)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<'a, T, B, S, I> BnbSolverSearchSession<'a, T, B, S, I>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
    S: TreeSearchMonitor<T>,
    I: IncumbentStore<T>,
{
    fn new(
        solver: &'a mut BnbSolver<T>,
        model: &'a Model<T>,
        builder: &'a mut B,
        monitor: &'a mut S,
        incumbent: I,
    ) -> Self {
        let ceiling = model.ceiling().unwrap_or_else(T::max_value);
        let best_objective = incumbent.initial_upper_bound().min(ceiling);

        Self {
            solver,
            model,
            builder,
            monitor,
            incumbent,
            state: SearchState::new(model.num_cities()),
            best_objective,
            best_tour: None,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    fn run(mut self) -> BnbSolverOutcome<T> {
        self.monitor.on_enter_search(self.model, &self.stats);

        if !self.initialize() {
            self.stats.set_total_time(self.start_time.elapsed());
            self.monitor.on_exit_search(&self.stats);
            return self.finalize_result(BnbTerminationReason::InfeasibilityProven);
        }

        let termination_reason = loop {
            self.best_objective = self.incumbent.tighten(self.best_objective);
            self.monitor.on_step(&self.state, &self.stats);
            self.stats.on_step();

            if let SearchCommand::Terminate(msg) =
                self.monitor.search_command(&self.state, &self.stats)
            {
                break BnbTerminationReason::Aborted(msg);
            }

            if self.solver.stack.is_current_level_empty() {
                if self.solver.stack.depth() <= 1 {
                    break BnbTerminationReason::OptimalityProven;
                }
                self.backtrack_step();
            } else {
                self.process_next_decision();
            }
        };

        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        self.finalize_result(termination_reason)
    }

    /// Maps the termination reason to an outcome.
    ///
    /// An exhausted tree proves that no tour below `best_objective` exists.
    /// The optimum is then our own best tour or, if the shared incumbent
    /// tightened the bound further, the shared tour. Without either the
    /// model is infeasible under its ceiling.
    fn finalize_result(mut self, reason: BnbTerminationReason) -> BnbSolverOutcome<T> {
        match reason {
            BnbTerminationReason::OptimalityProven | BnbTerminationReason::InfeasibilityProven => {
                match self.proven_optimum() {
                    Some(tour) => BnbSolverOutcome::optimal(tour, self.stats),
                    None => BnbSolverOutcome::infeasible(self.stats),
                }
            }
            BnbTerminationReason::Aborted(msg) => {
                BnbSolverOutcome::aborted(self.best_tour, msg, self.stats)
            }
        }
    }

    fn proven_optimum(&mut self) -> Option<Tour<T>> {
        let best_objective = self.best_objective;
        let own = self.best_tour.take();
        if let Some(tour) = own.filter(|t| t.objective_value() <= best_objective) {
            return Some(tour);
        }
        self.incumbent
            .snapshot()
            .filter(|t| t.objective_value() <= best_objective)
    }

    /// Sets up the root node. Returns `false` if the model is structurally
    /// infeasible.
    fn initialize(&mut self) -> bool {
        let num_cities = self.model.num_cities();
        self.solver.trail.ensure_capacity(num_cities);
        self.solver.stack.ensure_capacity(num_cities);
        self.state.initialize(self.model);

        if let Some(city) = (0..num_cities)
            .map(CityIndex::new)
            .find(|&city| self.state.domain_size(city) == 0)
        {
            tracing::warn!("city {} has no admissible successor", city.get());
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            return false;
        }

        // Root frame. Must exist before any decision is pushed.
        self.solver.trail.push_frame(&self.state);
        self.solver.stack.push_frame();
        self.stats.on_node_explored();

        // A pruned root simply leaves the root level empty.
        self.expand();
        true
    }

    #[inline]
    fn backtrack_step(&mut self) {
        self.stats.on_backtrack();
        self.monitor.on_backtrack(&self.state, &self.stats);

        self.solver.trail.backtrack(&mut self.state);
        self.solver.stack.pop_frame();
    }

    fn process_next_decision(&mut self) {
        let Some(decision) = self.solver.stack.pop() else {
            return;
        };
        self.stats.on_decision_generated();

        let current = self.state.current_objective();
        let new_objective = current.saturating_add(decision.cost_delta());
        if new_objective >= self.best_objective {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return;
        }

        self.descend(decision, new_objective);
    }

    fn descend(&mut self, decision: Decision<T>, new_objective: T) {
        debug_assert_eq!(
            decision.from(),
            self.state.tail(),
            "called `BnbSolverSearchSession::descend` with a decision that does not extend the tail"
        );

        self.solver.trail.push_frame(&self.state);
        self.solver
            .trail
            .apply_transition(&mut self.state, decision.to(), new_objective);
        self.solver.stack.push_frame();

        self.stats.on_node_explored();
        self.stats
            .on_depth_update(self.solver.stack.depth() as u64);
        self.monitor.on_descend(&self.state, decision, &self.stats);

        if self.state.is_complete() {
            self.handle_complete_solution(new_objective);
            return;
        }

        if !self.expand() {
            self.backtrack_step();
        }
    }

    fn handle_complete_solution(&mut self, new_objective: T) {
        if new_objective >= self.best_objective {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return;
        }

        match Tour::try_from(&self.state) {
            Ok(tour) => {
                self.best_objective = new_objective;
                self.incumbent.on_solution_found(&tour);
                self.stats.on_solution_found();
                self.monitor.on_solution_found(&tour, &self.stats);
                self.best_tour = Some(tour);
            }
            Err(()) => {
                self.stats.on_pruning_infeasible();
                self.monitor
                    .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            }
        }
    }

    /// Bounds the current node and, if it survives, enqueues its decisions.
    /// Returns `false` if the node was pruned.
    fn expand(&mut self) -> bool {
        let mut remaining = T::zero();
        let mut dead_end = false;
        for city in self.state.open_cities() {
            match self.state.cheapest_in_domain(self.model, city) {
                Some(cost) => remaining = remaining.saturating_add(cost),
                None => {
                    dead_end = true;
                    break;
                }
            }
        }

        if dead_end {
            self.stats.on_pruning_infeasible();
            self.monitor
                .on_prune(&self.state, PruneReason::Infeasible, &self.stats);
            return false;
        }

        let lower_bound = self.state.current_objective().saturating_add(remaining);
        self.monitor
            .on_lower_bound_computed(&self.state, lower_bound, remaining, &self.stats);

        if lower_bound >= self.best_objective {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(&self.state, PruneReason::BoundDominated, &self.stats);
            return false;
        }

        let decisions = self.builder.next_decision(self.model, &self.state);
        let count_before = self.solver.stack.num_entries();
        self.solver.stack.extend(decisions);
        let added = self.solver.stack.num_entries() - count_before;
        self.monitor
            .on_decisions_enqueued(&self.state, added, &self.stats);

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        branching::{
            lexical::IndexOrderBuilder, lookahead::LookaheadBuilder,
            nearest::NearestNeighborBuilder, randomized::RandomizedBuilder,
        },
        monitor::{
            frontier::{FrontierSamplingConfig, FrontierSamplingMonitor},
            no_op::NoOperationMonitor,
        },
    };
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;
    use waymark_model::{matrix::DistanceMatrix, model::ModelBuilder};
    use waymark_search::{
        coordination::SharedCoordinationState,
        result::{SolverResult, TerminationReason},
    };

    fn c(i: usize) -> CityIndex {
        CityIndex::new(i)
    }

    fn matrix(rows: &[Vec<i64>]) -> Arc<DistanceMatrix<i64>> {
        Arc::new(DistanceMatrix::from_rows(rows))
    }

    fn random_matrix(n: usize, seed: u64) -> Arc<DistanceMatrix<i64>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let costs = (0..n * n)
            .map(|k| if k / n == k % n { 0 } else { rng.random_range(1..100) })
            .collect();
        Arc::new(DistanceMatrix::from_flat(n, costs))
    }

    /// Enumerates every tour starting at city 0.
    fn brute_force(model: &Model<i64>) -> Option<i64> {
        fn recurse(
            model: &Model<i64>,
            path: &mut Vec<CityIndex>,
            used: &mut Vec<bool>,
            cost: i64,
            best: &mut Option<i64>,
        ) {
            let n = model.num_cities();
            let tail = path[path.len() - 1];
            if path.len() == n {
                if model.is_transition_allowed(tail, c(0)) {
                    let total = cost + model.cost(tail, c(0));
                    if best.is_none_or(|b| total < b) {
                        *best = Some(total);
                    }
                }
                return;
            }
            for next in 1..n {
                if used[next] || !model.is_transition_allowed(tail, c(next)) {
                    continue;
                }
                used[next] = true;
                path.push(c(next));
                recurse(model, path, used, cost + model.cost(tail, c(next)), best);
                path.pop();
                used[next] = false;
            }
        }

        let mut best = None;
        let mut used = vec![false; model.num_cities()];
        used[0] = true;
        recurse(model, &mut vec![c(0)], &mut used, 0, &mut best);
        best.filter(|&b| model.ceiling().is_none_or(|ceiling| b < ceiling))
    }

    fn square() -> Arc<DistanceMatrix<i64>> {
        // Optimal tour 0 -> 1 -> 2 -> 3 -> 0 with cost 4.
        matrix(&[
            vec![0, 1, 9, 9],
            vec![9, 0, 1, 9],
            vec![9, 9, 0, 1],
            vec![1, 9, 9, 0],
        ])
    }

    fn objective(outcome: &BnbSolverOutcome<i64>) -> Option<i64> {
        outcome.tour().map(|t| t.objective_value())
    }

    #[test]
    fn test_solves_square_to_optimality() {
        let model = ModelBuilder::new(square()).build();
        let mut solver = BnbSolver::new();
        let mut builder = NearestNeighborBuilder::new();
        let outcome = solver.solve(&model, &mut builder, NoOperationMonitor::new());

        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::OptimalityProven
        );
        let tour = outcome.tour().expect("optimal tour");
        assert_eq!(tour.objective_value(), 4);
        assert_eq!(tour.order(), &[c(0), c(1), c(2), c(3)]);
        assert!(outcome.statistics().solutions_found >= 1);
    }

    #[test]
    fn test_two_cities() {
        let model = ModelBuilder::new(matrix(&[vec![0, 3], vec![5, 0]])).build();
        let outcome =
            BnbSolver::new().solve(&model, &mut IndexOrderBuilder, NoOperationMonitor::new());
        assert!(matches!(outcome.result(), SolverResult::Optimal(_)));
        assert_eq!(objective(&outcome), Some(8));
    }

    #[test]
    fn test_every_builder_matches_brute_force() {
        for seed in 0..8 {
            let model = ModelBuilder::new(random_matrix(7, seed)).build();
            let expected = brute_force(&model);
            let mut solver = BnbSolver::preallocated(7);

            let nearest = solver.solve(
                &model,
                &mut NearestNeighborBuilder::new(),
                NoOperationMonitor::new(),
            );
            let lexical = solver.solve(&model, &mut IndexOrderBuilder, NoOperationMonitor::new());
            let lookahead = solver.solve(
                &model,
                &mut LookaheadBuilder::new(),
                NoOperationMonitor::new(),
            );
            let randomized = solver.solve(
                &model,
                &mut RandomizedBuilder::new(ChaCha8Rng::seed_from_u64(seed)),
                NoOperationMonitor::new(),
            );

            for outcome in [&nearest, &lexical, &lookahead, &randomized] {
                assert_eq!(
                    outcome.termination_reason(),
                    &TerminationReason::OptimalityProven,
                    "seed {}",
                    seed
                );
                assert_eq!(objective(outcome), expected, "seed {}", seed);
                let tour = outcome.tour().expect("tour");
                assert!(waymark_model::tour::is_permutation(tour.order()));
            }
        }
    }

    #[test]
    fn test_forbidden_transitions_are_respected() {
        for seed in 0..4 {
            let mut builder = ModelBuilder::new(random_matrix(6, 100 + seed));
            builder
                .forbid_transition(c(0), c(1))
                .forbid_transition(c(2), c(3))
                .forbid_transition(c(4), c(0));
            let model = builder.build();
            let expected = brute_force(&model);

            let outcome = BnbSolver::new().solve(
                &model,
                &mut LookaheadBuilder::new(),
                NoOperationMonitor::new(),
            );
            assert_eq!(objective(&outcome), expected);
            let tour = outcome.tour().expect("tour");
            assert_ne!(tour.successor_of(c(0)), Some(c(1)));
            assert_ne!(tour.successor_of(c(2)), Some(c(3)));
            assert_ne!(tour.successor_of(c(4)), Some(c(0)));
        }
    }

    #[test]
    fn test_city_without_successor_is_infeasible() {
        let mut builder = ModelBuilder::new(square());
        builder
            .forbid_transition(c(2), c(0))
            .forbid_transition(c(2), c(1))
            .forbid_transition(c(2), c(3));
        let model = builder.build();

        let outcome = BnbSolver::new().solve(
            &model,
            &mut NearestNeighborBuilder::new(),
            NoOperationMonitor::new(),
        );
        assert!(matches!(outcome.result(), SolverResult::Infeasible));
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::InfeasibilityProven
        );
    }

    #[test]
    fn test_ceiling_is_strict() {
        let mut solver = BnbSolver::new();

        let mut at_optimum = ModelBuilder::new(square());
        at_optimum.with_ceiling(4);
        let outcome = solver.solve(
            &at_optimum.build(),
            &mut NearestNeighborBuilder::new(),
            NoOperationMonitor::new(),
        );
        assert!(matches!(outcome.result(), SolverResult::Infeasible));

        let mut above_optimum = ModelBuilder::new(square());
        above_optimum.with_ceiling(5);
        let outcome = solver.solve(
            &above_optimum.build(),
            &mut NearestNeighborBuilder::new(),
            NoOperationMonitor::new(),
        );
        assert_eq!(objective(&outcome), Some(4));
    }

    #[test]
    fn test_shared_incumbent_tour_is_reported_as_optimum() {
        let model = ModelBuilder::new(square()).build();
        let shared = SharedIncumbent::new();
        let optimum = Tour::new(4, vec![c(0), c(1), c(2), c(3)]);
        assert!(shared.try_install(&optimum));

        let outcome = BnbSolver::new().solve_with_incumbent(
            &model,
            &mut IndexOrderBuilder,
            NoOperationMonitor::new(),
            &shared,
        );
        assert!(matches!(outcome.result(), SolverResult::Optimal(_)));
        assert_eq!(objective(&outcome), Some(4));
        // Nothing strictly better exists, so the run never installs a tour itself.
        assert_eq!(outcome.statistics().solutions_found, 0);
    }

    #[test]
    fn test_publishes_improvements_to_shared_incumbent() {
        let model = ModelBuilder::new(random_matrix(6, 7)).build();
        let shared = SharedIncumbent::new();
        let outcome = BnbSolver::new().solve_with_incumbent(
            &model,
            &mut NearestNeighborBuilder::new(),
            NoOperationMonitor::new(),
            &shared,
        );
        assert_eq!(Some(shared.upper_bound()), objective(&outcome));
    }

    struct StepLimit {
        limit: u64,
    }

    impl TreeSearchMonitor<i64> for StepLimit {
        fn name(&self) -> &str {
            "StepLimit"
        }
        fn on_enter_search(&mut self, _: &Model<i64>, _: &BnbSolverStatistics) {}
        fn on_exit_search(&mut self, _: &BnbSolverStatistics) {}
        fn search_command(
            &mut self,
            _: &SearchState<i64>,
            statistics: &BnbSolverStatistics,
        ) -> SearchCommand {
            if statistics.steps >= self.limit {
                SearchCommand::Terminate("step limit".to_string())
            } else {
                SearchCommand::Continue
            }
        }
        fn on_step(&mut self, _: &SearchState<i64>, _: &BnbSolverStatistics) {}
        fn on_solution_found(&mut self, _: &Tour<i64>, _: &BnbSolverStatistics) {}
    }

    #[test]
    fn test_abort_before_first_tour_is_unknown() {
        let model = ModelBuilder::new(random_matrix(8, 3)).build();
        let outcome = BnbSolver::new().solve(
            &model,
            &mut NearestNeighborBuilder::new(),
            StepLimit { limit: 1 },
        );
        assert!(matches!(outcome.result(), SolverResult::Unknown));
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::Aborted("step limit".to_string())
        );
    }

    #[test]
    fn test_abort_after_first_tour_is_feasible() {
        let model = ModelBuilder::new(random_matrix(9, 11)).build();
        // A nearest neighbour dive reaches a leaf within 2n steps.
        let outcome = BnbSolver::new().solve(
            &model,
            &mut NearestNeighborBuilder::new(),
            StepLimit { limit: 40 },
        );
        assert!(matches!(outcome.result(), SolverResult::Feasible(_)));
    }

    #[test]
    fn test_solver_is_reusable_after_a_run() {
        let mut solver = BnbSolver::new();
        let first = ModelBuilder::new(random_matrix(6, 1)).build();
        let second = ModelBuilder::new(random_matrix(5, 2)).build();

        let a = solver.solve(&first, &mut IndexOrderBuilder, NoOperationMonitor::new());
        assert!(solver.trail.is_empty());
        assert!(solver.stack.is_empty());
        let b = solver.solve(&second, &mut IndexOrderBuilder, NoOperationMonitor::new());

        assert_eq!(objective(&a), brute_force(&first));
        assert_eq!(objective(&b), brute_force(&second));
    }

    #[test]
    fn test_frontier_monitor_publishes_during_search() {
        let model = ModelBuilder::new(random_matrix(8, 5)).build();
        let coordination = Arc::new(SharedCoordinationState::new());
        let config = FrontierSamplingConfig::default()
            .with_warmup_solutions(1)
            .with_sample_interval(5);
        let mut monitor = FrontierSamplingMonitor::new(Arc::clone(&coordination), config);

        let outcome = BnbSolver::new().solve(
            &model,
            &mut NearestNeighborBuilder::new(),
            &mut monitor,
        );
        assert_eq!(objective(&outcome), brute_force(&model));
        assert!(monitor.published() > 0);
        assert_eq!(coordination.masks_published(), monitor.published());

        let mask = coordination.latest_mask().expect("published mask");
        assert_eq!(mask.num_cities(), 8);
        // Self loops are never admissible.
        assert!((0..8).all(|i| !mask.is_transition_allowed(c(i), c(i))));
    }
}
