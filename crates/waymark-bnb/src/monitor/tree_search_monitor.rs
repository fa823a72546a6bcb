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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait and `PruneReason` for observing and
//! controlling branch and bound. Callbacks track the solver lifecycle, and a
//! monitor can influence execution via `SearchCommand` (default: Continue).
//!
//! Lifecycle highlights
//! - enter → step → {lower bound/prune | decisions/descend/backtrack} → solution → exit
//! - `BnbSolverStatistics` is provided to every callback.
//! - `on_step` sees the live `SearchState`, so a monitor can read every
//!   successor domain at that instant.
//!
//! Methods take `&mut self` and run on the search thread; keep them fast.

use crate::{branching::decision::Decision, state::SearchState, stats::BnbSolverStatistics};
use num_traits::{PrimInt, Signed};
use waymark_model::{model::Model, tour::Tour};
use waymark_search::monitor::search_monitor::SearchCommand;

/// Reasons for pruning a search state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PruneReason {
    /// Some open city has no successor left.
    Infeasible,
    /// The subtree is dominated by the current bound.
    BoundDominated,
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::Infeasible => write!(f, "Infeasible"),
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
        }
    }
}

/// Trait for monitoring and controlling the search process of the solver.
pub trait TreeSearchMonitor<T>
where
    T: PrimInt + Signed,
{
    /// Returns the name of the monitor.
    fn name(&self) -> &str;
    /// Called when the search starts.
    fn on_enter_search(&mut self, model: &Model<T>, statistics: &BnbSolverStatistics);
    /// Called when the search ends.
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics);
    /// Called to determine the next action of the search.
    fn search_command(
        &mut self,
        _state: &SearchState<T>,
        _statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        SearchCommand::Continue
    }
    /// Called at each step of the search.
    fn on_step(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics);
    /// Called when a tour is accepted as the new best of this run.
    fn on_solution_found(&mut self, tour: &Tour<T>, statistics: &BnbSolverStatistics);
    /// Called when a node lower bound was computed.
    /// `estimated_remaining` is the part of `lower_bound` not yet paid for.
    fn on_lower_bound_computed(
        &mut self,
        _state: &SearchState<T>,
        _lower_bound: T,
        _estimated_remaining: T,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    /// Called when a search state is pruned.
    fn on_prune(
        &mut self,
        _state: &SearchState<T>,
        _reason: PruneReason,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    /// Called when decisions are enqueued for exploration.
    fn on_decisions_enqueued(
        &mut self,
        _state: &SearchState<T>,
        _count: usize,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    /// Called after descending into a child state.
    fn on_descend(
        &mut self,
        _state: &SearchState<T>,
        _decision: Decision<T>,
        _statistics: &BnbSolverStatistics,
    ) {
    }
    /// Called before backtracking out of a state.
    fn on_backtrack(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics) {}
}

impl<T, M> TreeSearchMonitor<T> for &mut M
where
    T: PrimInt + Signed,
    M: TreeSearchMonitor<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }
    fn on_enter_search(&mut self, model: &Model<T>, statistics: &BnbSolverStatistics) {
        (**self).on_enter_search(model, statistics)
    }
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        (**self).on_exit_search(statistics)
    }
    fn search_command(
        &mut self,
        state: &SearchState<T>,
        statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        (**self).search_command(state, statistics)
    }
    fn on_step(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        (**self).on_step(state, statistics)
    }
    fn on_solution_found(&mut self, tour: &Tour<T>, statistics: &BnbSolverStatistics) {
        (**self).on_solution_found(tour, statistics)
    }
    fn on_lower_bound_computed(
        &mut self,
        state: &SearchState<T>,
        lower_bound: T,
        estimated_remaining: T,
        statistics: &BnbSolverStatistics,
    ) {
        (**self).on_lower_bound_computed(state, lower_bound, estimated_remaining, statistics)
    }
    fn on_prune(
        &mut self,
        state: &SearchState<T>,
        reason: PruneReason,
        statistics: &BnbSolverStatistics,
    ) {
        (**self).on_prune(state, reason, statistics)
    }
    fn on_decisions_enqueued(
        &mut self,
        state: &SearchState<T>,
        count: usize,
        statistics: &BnbSolverStatistics,
    ) {
        (**self).on_decisions_enqueued(state, count, statistics)
    }
    fn on_descend(
        &mut self,
        state: &SearchState<T>,
        decision: Decision<T>,
        statistics: &BnbSolverStatistics,
    ) {
        (**self).on_descend(state, decision, statistics)
    }
    fn on_backtrack(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        (**self).on_backtrack(state, statistics)
    }
}
