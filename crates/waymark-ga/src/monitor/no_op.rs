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
    chromosome::Phenotype,
    monitor::evolution_monitor::{EvolutionMonitor, GenerationReport},
    stats::EvolutionStatistics,
};

/// A monitor that ignores every event and never terminates the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOperationMonitor;

impl EvolutionMonitor for NoOperationMonitor {
    #[inline(always)]
    fn name(&self) -> &str {
        "NoOperationMonitor"
    }

    #[inline(always)]
    fn on_start(&mut self, _num_cities: usize) {}

    #[inline(always)]
    fn on_generation(&mut self, _report: &GenerationReport, _statistics: &EvolutionStatistics) {}

    #[inline(always)]
    fn on_end(&mut self, _best: &Phenotype, _statistics: &EvolutionStatistics) {}
}
