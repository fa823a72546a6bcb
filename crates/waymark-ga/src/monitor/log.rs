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
    fitness::INFEASIBLE_FITNESS,
    monitor::evolution_monitor::{EvolutionMonitor, GenerationReport},
    stats::EvolutionStatistics,
};

/// Logs run progress through `tracing` every `interval` generations.
#[derive(Debug, Clone)]
pub struct LogEvolutionMonitor {
    interval: u64,
}

impl Default for LogEvolutionMonitor {
    fn default() -> Self {
        Self { interval: 1_000 }
    }
}

impl LogEvolutionMonitor {
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[inline]
    pub fn new(interval: u64) -> Self {
        assert!(
            interval > 0,
            "called `LogEvolutionMonitor::new` with a zero interval"
        );
        Self { interval }
    }
}

fn display_fitness(fitness: f64) -> Option<f64> {
    (fitness < INFEASIBLE_FITNESS).then_some(fitness)
}

impl EvolutionMonitor for LogEvolutionMonitor {
    fn name(&self) -> &str {
        "LogEvolutionMonitor"
    }

    fn on_start(&mut self, num_cities: usize) {
        tracing::debug!(num_cities, "evolution started");
    }

    fn on_generation(&mut self, report: &GenerationReport, statistics: &EvolutionStatistics) {
        if report.generation % self.interval != 0 {
            return;
        }
        tracing::debug!(
            generation = report.generation,
            best = ?display_fitness(report.best_fitness),
            run_best = ?display_fitness(report.run_best_fitness),
            feasible = report.feasible_individuals,
            population = report.population_size,
            evaluations = statistics.evaluations,
            "evolution progress"
        );
    }

    fn on_end(&mut self, best: &Phenotype, statistics: &EvolutionStatistics) {
        tracing::debug!(
            best = ?display_fitness(best.fitness()),
            generations = statistics.generations,
            elapsed_secs = statistics.time_total.as_secs_f32(),
            "evolution finished"
        );
    }
}
