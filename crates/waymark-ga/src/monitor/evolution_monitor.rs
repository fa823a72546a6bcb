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

//! Monitoring interface for evolutionary runs.
//!
//! The engine calls `on_start` once, `on_generation` after every completed
//! generation and `on_end` once with the best individual of the run.
//! `search_command` is polled before each generation; returning
//! `Terminate` ends the run early.

use crate::{chromosome::Phenotype, stats::EvolutionStatistics};
use waymark_search::monitor::search_monitor::SearchCommand;

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    /// One-based generation number.
    pub generation: u64,
    /// Best fitness within this generation.
    pub best_fitness: f64,
    /// Best fitness seen so far in the run.
    pub run_best_fitness: f64,
    /// Number of feasible individuals in this generation.
    pub feasible_individuals: usize,
    /// Size of the population.
    pub population_size: usize,
}

impl GenerationReport {
    /// Returns `true` if this generation set a new best for the run.
    #[inline]
    pub fn is_run_best(&self) -> bool {
        self.best_fitness <= self.run_best_fitness
    }
}

/// A monitor for evolutionary runs.
pub trait EvolutionMonitor {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called before the initial population is created.
    fn on_start(&mut self, num_cities: usize);

    /// Called after every generation.
    fn on_generation(&mut self, report: &GenerationReport, statistics: &EvolutionStatistics);

    /// Called once the run is over.
    fn on_end(&mut self, best: &Phenotype, statistics: &EvolutionStatistics);

    /// Determines whether the run continues.
    fn search_command(&mut self, _statistics: &EvolutionStatistics) -> SearchCommand {
        SearchCommand::Continue
    }
}

impl<M> EvolutionMonitor for &mut M
where
    M: EvolutionMonitor + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }
    fn on_start(&mut self, num_cities: usize) {
        (**self).on_start(num_cities)
    }
    fn on_generation(&mut self, report: &GenerationReport, statistics: &EvolutionStatistics) {
        (**self).on_generation(report, statistics)
    }
    fn on_end(&mut self, best: &Phenotype, statistics: &EvolutionStatistics) {
        (**self).on_end(best, statistics)
    }
    fn search_command(&mut self, statistics: &EvolutionStatistics) -> SearchCommand {
        (**self).search_command(statistics)
    }
}

impl std::fmt::Debug for dyn EvolutionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EvolutionMonitor {{ name: {} }}", self.name())
    }
}

impl std::fmt::Display for dyn EvolutionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EvolutionMonitor: {}", self.name())
    }
}
