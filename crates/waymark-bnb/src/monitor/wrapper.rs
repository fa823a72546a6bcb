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

//! Adapter for portfolio search monitors
//!
//! `WrapperMonitor` bridges this crate's `TreeSearchMonitor` with a generic
//! `SearchMonitor` from `waymark_search`. It forwards enter, step, solution,
//! exit and `search_command` to the inner monitor and ignores the
//! tree-specific callbacks.

use crate::{
    monitor::tree_search_monitor::TreeSearchMonitor, state::SearchState,
    stats::BnbSolverStatistics,
};
use num_traits::{PrimInt, Signed};
use waymark_model::{model::Model, tour::Tour};
use waymark_search::monitor::search_monitor::{SearchCommand, SearchMonitor};

/// A tree search monitor wrapping a general search monitor.
pub struct WrapperMonitor<'a, T> {
    inner: &'a mut dyn SearchMonitor<T>,
    name: String,
}

impl<'a, T> WrapperMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    pub fn new(inner: &'a mut dyn SearchMonitor<T>) -> Self {
        let name = format!("WrapperMonitor({})", inner.name());
        Self { inner, name }
    }
}

impl<'a, T> TreeSearchMonitor<T> for WrapperMonitor<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline(always)]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    fn on_enter_search(&mut self, model: &Model<T>, _statistics: &BnbSolverStatistics) {
        self.inner.on_enter_search(model);
    }

    #[inline(always)]
    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {
        self.inner.on_exit_search();
    }

    #[inline(always)]
    fn search_command(
        &mut self,
        _state: &SearchState<T>,
        _statistics: &BnbSolverStatistics,
    ) -> SearchCommand {
        self.inner.search_command()
    }

    #[inline(always)]
    fn on_step(&mut self, _state: &SearchState<T>, _statistics: &BnbSolverStatistics) {
        self.inner.on_step();
    }

    #[inline(always)]
    fn on_solution_found(&mut self, tour: &Tour<T>, _statistics: &BnbSolverStatistics) {
        self.inner.on_solution_found(tour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_search::monitor::search_monitor::DummyMonitor;

    #[test]
    fn test_name_wraps_inner_name() {
        let mut inner = DummyMonitor::<i64>::new();
        let wrapper = WrapperMonitor::new(&mut inner);
        assert_eq!(wrapper.name(), "WrapperMonitor(DummyMonitor)");
    }
}
