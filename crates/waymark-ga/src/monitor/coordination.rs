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

//! Bridges evolutionary runs to the shared coordination state.

use crate::{
    chromosome::Phenotype,
    monitor::evolution_monitor::{EvolutionMonitor, GenerationReport},
    stats::EvolutionStatistics,
};
use std::sync::Arc;
use waymark_search::coordination::SharedCoordinationState;

/// Reports the best fitness of every generation to `report_distance`.
///
/// Reports are sent whether or not they improve anything; the coordination
/// state discards non-improving and infeasible values itself.
#[derive(Debug, Clone)]
pub struct CoordinationReportingMonitor {
    coordination: Arc<SharedCoordinationState>,
    reports: u64,
    accepted: u64,
}

impl CoordinationReportingMonitor {
    #[inline]
    pub fn new(coordination: Arc<SharedCoordinationState>) -> Self {
        Self {
            coordination,
            reports: 0,
            accepted: 0,
        }
    }

    /// Number of distances reported.
    #[inline]
    pub fn reports(&self) -> u64 {
        self.reports
    }

    /// Number of reports that tightened the shared best distance.
    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted
    }
}

impl EvolutionMonitor for CoordinationReportingMonitor {
    fn name(&self) -> &str {
        "CoordinationReportingMonitor"
    }

    fn on_start(&mut self, _num_cities: usize) {}

    fn on_generation(&mut self, report: &GenerationReport, _statistics: &EvolutionStatistics) {
        self.reports += 1;
        if self.coordination.report_distance(report.best_fitness) {
            self.accepted += 1;
            tracing::debug!(
                generation = report.generation,
                distance = report.best_fitness,
                "evolution tightened the shared distance"
            );
        }
    }

    fn on_end(&mut self, _best: &Phenotype, _statistics: &EvolutionStatistics) {}
}
