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

//! Counters for evolutionary runs.
//!
//! Updated on the hot path with saturating arithmetic; consumed by
//! monitors and attached to every `EvolutionOutcome`.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EvolutionStatistics {
    /// Generations completed.
    pub generations: u64,

    /// Fitness evaluations, the initial population included.
    pub evaluations: u64,

    /// Evaluations that hit a forbidden transition.
    pub infeasible_evaluations: u64,

    /// Offspring pairs recombined.
    pub crossovers: u64,

    /// Genes swapped by mutation.
    pub mutations: u64,

    /// Individuals retired for exceeding the maximum age.
    pub age_replacements: u64,

    /// Generations that improved the best fitness of the run.
    pub improvements: u64,

    /// Total time taken by the run.
    pub time_total: Duration,
}

impl EvolutionStatistics {
    #[inline]
    pub fn on_generation(&mut self) {
        self.generations = self.generations.saturating_add(1);
    }

    #[inline]
    pub fn on_evaluation(&mut self, feasible: bool) {
        self.evaluations = self.evaluations.saturating_add(1);
        if !feasible {
            self.infeasible_evaluations = self.infeasible_evaluations.saturating_add(1);
        }
    }

    #[inline]
    pub fn on_crossover(&mut self) {
        self.crossovers = self.crossovers.saturating_add(1);
    }

    #[inline]
    pub fn on_mutations(&mut self, swaps: usize) {
        self.mutations = self.mutations.saturating_add(swaps as u64);
    }

    #[inline]
    pub fn on_age_replacement(&mut self) {
        self.age_replacements = self.age_replacements.saturating_add(1);
    }

    #[inline]
    pub fn on_improvement(&mut self) {
        self.improvements = self.improvements.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Share of evaluations that were feasible, `None` before any evaluation.
    #[inline]
    pub fn feasible_ratio(&self) -> Option<f64> {
        if self.evaluations == 0 {
            return None;
        }
        let feasible = self.evaluations - self.infeasible_evaluations;
        Some(feasible as f64 / self.evaluations as f64)
    }
}

impl std::fmt::Display for EvolutionStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Waymark-GA Statistics:")?;
        writeln!(f, "   Generations:         {}", self.generations)?;
        writeln!(f, "   Evaluations:         {}", self.evaluations)?;
        writeln!(f, "   Infeasible:          {}", self.infeasible_evaluations)?;
        writeln!(f, "   Crossovers:          {}", self.crossovers)?;
        writeln!(f, "   Mutations:           {}", self.mutations)?;
        writeln!(f, "   Age Replacements:    {}", self.age_replacements)?;
        writeln!(f, "   Improvements:        {}", self.improvements)?;
        writeln!(f, "   Total Time:          {:?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = EvolutionStatistics::default();
        assert_eq!(stats.feasible_ratio(), None);

        stats.on_evaluation(true);
        stats.on_evaluation(false);
        stats.on_evaluation(true);
        stats.on_evaluation(true);
        stats.on_mutations(3);
        stats.on_mutations(0);
        stats.on_generation();

        assert_eq!(stats.evaluations, 4);
        assert_eq!(stats.infeasible_evaluations, 1);
        assert_eq!(stats.feasible_ratio(), Some(0.75));
        assert_eq!(stats.mutations, 3);
        assert_eq!(stats.generations, 1);
        assert!(stats.to_string().contains("Generations:         1"));
    }

    #[test]
    fn test_saturation() {
        let mut stats = EvolutionStatistics {
            mutations: u64::MAX - 1,
            ..Default::default()
        };
        stats.on_mutations(10);
        assert_eq!(stats.mutations, u64::MAX);
    }
}
