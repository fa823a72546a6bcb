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

//! Monitoring combinators for tree search
//!
//! Provides `CompositeTreeSearchMonitor`, a fan-out monitor that forwards every
//! event to its children, so logging, frontier sampling and early stopping
//! can be mixed without coupling them to the solver.
//!
//! Behavior
//! - Events are dispatched to child monitors in insertion order.
//! - `search_command` short-circuits on the first non-`Continue` response;
//!   put stricter stop conditions first.

use crate::{
    branching::decision::Decision,
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    state::SearchState,
    stats::BnbSolverStatistics,
};
use num_traits::{PrimInt, Signed};
use waymark_model::{model::Model, tour::Tour};
use waymark_search::monitor::search_monitor::SearchCommand;

/// A tree search monitor that forwards events to all of its children.
pub struct CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    monitors: Vec<Box<dyn TreeSearchMonitor<T> + 'a>>,
}

impl<'a, T> Default for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Adds a monitor; it receives events after every monitor added before it.
    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor<T> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline(always)]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor<T> + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, T> FromIterator<Box<dyn TreeSearchMonitor<T> + 'a>> for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn from_iter<I: IntoIterator<Item = Box<dyn TreeSearchMonitor<T> + 'a>>>(iter: I) -> Self {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> std::fmt::Debug for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.monitors.iter().map(|m| m.name()).collect();
        f.debug_struct("CompositeTreeSearchMonitor")
            .field("monitors", &names)
            .finish()
    }
}

impl<'a, T> TreeSearchMonitor<T> for CompositeTreeSearchMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &Model<T>, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_enter_search(model, statistics);
        }
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_exit_search(statistics);
        }
    }

    fn search_command(
        &mut self,
        state: &SearchState<T>,
        statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        for monitor in self.monitors.iter_mut() {
            let command = monitor.search_command(state, statistics);
            if command != SearchCommand::Continue {
                return command;
            }
        }
        SearchCommand::Continue
    }

    fn on_step(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_step(state, statistics);
        }
    }

    fn on_solution_found(&mut self, tour: &Tour<T>, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_solution_found(tour, statistics);
        }
    }

    fn on_lower_bound_computed(
        &mut self,
        state: &SearchState<T>,
        lower_bound: T,
        estimated_remaining: T,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_lower_bound_computed(state, lower_bound, estimated_remaining, statistics);
        }
    }

    fn on_prune(
        &mut self,
        state: &SearchState<T>,
        reason: PruneReason,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_prune(state, reason, statistics);
        }
    }

    fn on_decisions_enqueued(
        &mut self,
        state: &SearchState<T>,
        count: usize,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_decisions_enqueued(state, count, statistics);
        }
    }

    fn on_descend(
        &mut self,
        state: &SearchState<T>,
        decision: Decision<T>,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_descend(state, decision, statistics);
        }
    }

    fn on_backtrack(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_backtrack(state, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waymark_model::{matrix::DistanceMatrix, model::ModelBuilder};

    struct Counting<'c> {
        steps: &'c mut u32,
        stop_after: Option<u32>,
    }

    impl<'c> TreeSearchMonitor<i64> for Counting<'c> {
        fn name(&self) -> &str {
            "Counting"
        }
        fn on_enter_search(&mut self, _m: &Model<i64>, _s: &BnbSolverStatistics) {}
        fn on_exit_search(&mut self, _s: &BnbSolverStatistics) {}
        fn on_step(&mut self, _st: &SearchState<i64>, _s: &BnbSolverStatistics) {
            *self.steps += 1;
        }
        fn on_solution_found(&mut self, _t: &Tour<i64>, _s: &BnbSolverStatistics) {}
        fn search_command(
            &mut self,
            _st: &SearchState<i64>,
            _s: &BnbSolverStatistics,
        ) -> SearchCommand {
            match self.stop_after {
                Some(limit) if *self.steps >= limit => SearchCommand::Terminate("limit".into()),
                _ => SearchCommand::Continue,
            }
        }
    }

    fn state() -> SearchState<i64> {
        let matrix = DistanceMatrix::<i64>::from_rows(&[vec![0, 1], vec![1, 0]]);
        let model = ModelBuilder::new(Arc::new(matrix)).build();
        let mut s = SearchState::new(2);
        s.initialize(&model);
        s
    }

    #[test]
    fn test_fan_out_and_first_terminate_wins() {
        let (mut a, mut b) = (0u32, 0u32);
        let s = state();
        let stats = BnbSolverStatistics::default();
        {
            let mut composite = CompositeTreeSearchMonitor::with_capacity(2);
            composite.add_monitor(Counting {
                steps: &mut a,
                stop_after: Some(2),
            });
            composite.add_monitor(Counting {
                steps: &mut b,
                stop_after: None,
            });
            assert_eq!(composite.len(), 2);

            composite.on_step(&s, &stats);
            assert_eq!(composite.search_command(&s, &stats), SearchCommand::Continue);
            composite.on_step(&s, &stats);
            assert_eq!(
                composite.search_command(&s, &stats),
                SearchCommand::Terminate("limit".into())
            );
        }
        assert_eq!((a, b), (2, 2));
    }

    #[test]
    fn test_empty_composite_continues() {
        let mut composite = CompositeTreeSearchMonitor::<i64>::default();
        assert!(composite.is_empty());
        let s = state();
        assert_eq!(
            composite.search_command(&s, &BnbSolverStatistics::default()),
            SearchCommand::Continue
        );
    }
}
