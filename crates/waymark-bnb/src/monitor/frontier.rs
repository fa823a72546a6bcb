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

//! Frontier sampling
//!
//! `FrontierSamplingMonitor` turns the live successor domains of a running
//! search into `ConnectionMask` snapshots and publishes them through the
//! `SharedCoordinationState`.
//!
//! Policy
//! - The first `warmup_solutions` accepted tours are ignored.
//! - Afterwards every step whose count is a multiple of `sample_interval`
//!   snapshots the whole domain relation (a full overwrite, never a merge)
//!   and hands the fresh mask to `publish_mask` by value.
//! - Several workers may publish; the last writer wins.

use crate::{
    monitor::tree_search_monitor::TreeSearchMonitor, state::SearchState,
    stats::BnbSolverStatistics,
};
use num_traits::{PrimInt, Signed};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use waymark_model::{mask::ConnectionMask, model::Model, tour::Tour};
use waymark_search::coordination::SharedCoordinationState;

/// When to sample the search frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontierSamplingConfig {
    /// Accepted tours to ignore before the first sample.
    pub warmup_solutions: u64,
    /// Steps between two samples.
    pub sample_interval: u64,
}

impl Default for FrontierSamplingConfig {
    fn default() -> Self {
        Self {
            warmup_solutions: 5,
            sample_interval: 10_000,
        }
    }
}

impl FrontierSamplingConfig {
    #[inline]
    pub fn with_warmup_solutions(mut self, warmup_solutions: u64) -> Self {
        self.warmup_solutions = warmup_solutions;
        self
    }

    /// # Panics
    ///
    /// Panics if `sample_interval` is zero.
    #[inline]
    pub fn with_sample_interval(mut self, sample_interval: u64) -> Self {
        assert!(
            sample_interval > 0,
            "called `FrontierSamplingConfig::with_sample_interval` with a zero interval"
        );
        self.sample_interval = sample_interval;
        self
    }
}

/// Publishes snapshots of a worker's successor domains.
#[derive(Debug)]
pub struct FrontierSamplingMonitor {
    coordination: Arc<SharedCoordinationState>,
    config: FrontierSamplingConfig,
    steps: u64,
    solutions: u64,
    published: u64,
}

impl FrontierSamplingMonitor {
    pub fn new(coordination: Arc<SharedCoordinationState>, config: FrontierSamplingConfig) -> Self {
        Self {
            coordination,
            config,
            steps: 0,
            solutions: 0,
            published: 0,
        }
    }

    /// Returns the number of masks this monitor published.
    #[inline]
    pub fn published(&self) -> u64 {
        self.published
    }

    #[inline]
    pub fn config(&self) -> &FrontierSamplingConfig {
        &self.config
    }

    #[inline]
    fn warmed_up(&self) -> bool {
        self.solutions >= self.config.warmup_solutions
    }
}

impl<T> TreeSearchMonitor<T> for FrontierSamplingMonitor
where
    T: PrimInt + Signed,
{
    fn name(&self) -> &str {
        "FrontierSamplingMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model<T>, _statistics: &BnbSolverStatistics) {
        self.steps = 0;
        self.solutions = 0;
    }

    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {}

    fn on_step(&mut self, state: &SearchState<T>, _statistics: &BnbSolverStatistics) {
        self.steps = self.steps.saturating_add(1);
        // A zero interval never samples instead of dividing by zero.
        if !self.warmed_up()
            || self.config.sample_interval == 0
            || self.steps % self.config.sample_interval != 0
        {
            return;
        }

        let mask = ConnectionMask::from_domains(state);
        tracing::debug!(
            step = self.steps,
            allowed = mask.count_allowed(),
            "publishing frontier mask"
        );
        self.coordination.publish_mask(mask);
        self.published += 1;
    }

    fn on_solution_found(&mut self, _tour: &Tour<T>, _statistics: &BnbSolverStatistics) {
        self.solutions = self.solutions.saturating_add(1);
    }
}
