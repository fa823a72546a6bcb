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
    monitor::tree_search_monitor::TreeSearchMonitor, state::SearchState,
    stats::BnbSolverStatistics,
};
use num_traits::{PrimInt, Signed, ToPrimitive};
use std::time::{Duration, Instant};
use waymark_model::{model::Model, tour::Tour};

/// Periodic search progress through `tracing`.
///
/// The clock is only read when `steps & clock_check_mask == 0`, and a line
/// is emitted at most once per `log_interval`.
#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor<T> {
    worker: String,
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_objective: Option<T>,
}

impl<T> LogTreeSearchMonitor<T> {
    pub fn new<S>(worker: S, log_interval: Duration, clock_check_mask: u64) -> Self
    where
        S: Into<String>,
    {
        let now = Instant::now();
        Self {
            worker: worker.into(),
            start_time: now,
            last_log_time: now,
            log_interval,
            clock_check_mask,
            best_objective: None,
        }
    }
}

impl<T> Default for LogTreeSearchMonitor<T> {
    fn default() -> Self {
        Self::new("bnb", Duration::from_secs(1), 4095)
    }
}

impl<T> std::fmt::Display for LogTreeSearchMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(worker: {}, log_interval: {:?}, clock_check_mask: {})",
            self.worker, self.log_interval, self.clock_check_mask
        )
    }
}

impl<T> TreeSearchMonitor<T> for LogTreeSearchMonitor<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &Model<T>, _statistics: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_objective = None;
        tracing::info!(
            worker = %self.worker,
            cities = model.num_cities(),
            ceiling = ?model.ceiling().map(|c| c.to_i64()),
            "exact search started"
        );
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        tracing::info!(
            worker = %self.worker,
            nodes = statistics.nodes_explored,
            solutions = statistics.solutions_found,
            elapsed = ?statistics.time_total,
            "exact search finished"
        );
    }

    fn on_step(&mut self, state: &SearchState<T>, statistics: &BnbSolverStatistics) {
        if (statistics.steps & self.clock_check_mask) != 0
            || self.last_log_time.elapsed() < self.log_interval
        {
            return;
        }

        let best = match self.best_objective {
            Some(objective) => objective.to_string(),
            None => "inf".to_string(),
        };
        tracing::info!(
            worker = %self.worker,
            elapsed_secs = self.start_time.elapsed().as_secs_f32(),
            nodes = statistics.nodes_explored,
            depth = state.path_len(),
            best = %best,
            objective = %state.current_objective(),
            backtracks = statistics.backtracks,
            pruned = statistics.prunings_bound + statistics.prunings_infeasible,
            "exact search progress"
        );
        self.last_log_time = Instant::now();
    }

    fn on_solution_found(&mut self, tour: &Tour<T>, _statistics: &BnbSolverStatistics) {
        self.best_objective = Some(tour.objective_value());
        tracing::debug!(
            worker = %self.worker,
            objective = %tour.objective_value(),
            "exact search accepted a tour"
        );
    }
}
