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

use crate::{
    bnb::BnbSolver,
    branching::decision::DecisionBuilder,
    monitor::{
        composite::CompositeTreeSearchMonitor, frontier::FrontierSamplingMonitor,
        log::LogTreeSearchMonitor, wrapper::WrapperMonitor,
    },
};
use waymark_search::{
    num::SolverNumeric,
    portfolio::{PortfolioSolver, PortfolioSolverContext, PortfolioSolverResult},
};

/// Runs a `BnbSolver` as a portfolio worker.
///
/// Besides the monitor handed in by the portfolio, the worker can carry its
/// own frontier sampling and logging monitors. They persist across
/// invocations so their counters keep accumulating.
pub struct BnbPortfolioSolver<T, B>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
{
    inner: BnbSolver<T>,
    decision_builder: B,
    frontier: Option<FrontierSamplingMonitor>,
    log: Option<LogTreeSearchMonitor<T>>,
}

impl<T, B> BnbPortfolioSolver<T, B>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
{
    #[inline]
    pub fn new(decision_builder: B) -> Self {
        Self {
            inner: BnbSolver::<T>::new(),
            decision_builder,
            frontier: None,
            log: None,
        }
    }

    #[inline]
    pub fn preallocated(num_cities: usize, decision_builder: B) -> Self {
        Self {
            inner: BnbSolver::<T>::preallocated(num_cities),
            decision_builder,
            frontier: None,
            log: None,
        }
    }

    /// Attaches a monitor that publishes connection masks while searching.
    #[inline]
    pub fn with_frontier_sampling(mut self, monitor: FrontierSamplingMonitor) -> Self {
        self.frontier = Some(monitor);
        self
    }

    /// Attaches a progress logging monitor.
    #[inline]
    pub fn with_log_monitor(mut self, monitor: LogTreeSearchMonitor<T>) -> Self {
        self.log = Some(monitor);
        self
    }

    #[inline]
    pub fn inner(&self) -> &BnbSolver<T> {
        &self.inner
    }

    #[inline]
    pub fn decision_builder(&self) -> &B {
        &self.decision_builder
    }

    #[inline]
    pub fn frontier(&self) -> Option<&FrontierSamplingMonitor> {
        self.frontier.as_ref()
    }
}

impl<T, B> std::fmt::Debug for BnbPortfolioSolver<T, B>
where
    T: SolverNumeric,
    B: DecisionBuilder<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BnbPortfolioSolver")
            .field("decision_builder", &self.decision_builder.name())
            .field("frontier", &self.frontier.is_some())
            .field("log", &self.log.is_some())
            .finish()
    }
}

impl<T, B> PortfolioSolver<T> for BnbPortfolioSolver<T, B>
where
    T: SolverNumeric,
    B: DecisionBuilder<T> + Send,
{
    fn invoke<'a>(&mut self, context: PortfolioSolverContext<'a, T>) -> PortfolioSolverResult<T> {
        let mut monitor = CompositeTreeSearchMonitor::with_capacity(3);
        monitor.add_monitor(WrapperMonitor::new(context.monitor));
        if let Some(frontier) = self.frontier.as_mut() {
            monitor.add_monitor(frontier);
        }
        if let Some(log) = self.log.as_mut() {
            monitor.add_monitor(log);
        }

        let outcome = self.inner.solve_with_incumbent(
            context.model,
            &mut self.decision_builder,
            monitor,
            context.incumbent,
        );

        outcome.into()
    }

    fn name(&self) -> &str {
        "BnbPortfolioSolver"
    }
}
