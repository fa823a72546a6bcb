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

use crate::stats::EvolutionStatistics;
use waymark_model::{index::CityIndex, tour::Tour};

/// Why an evolutionary run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvolutionTerminationReason {
    /// The generation budget was used up.
    GenerationLimit,

    /// A monitor requested termination.
    Aborted(String),
}

impl std::fmt::Display for EvolutionTerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvolutionTerminationReason::GenerationLimit => write!(f, "Generation Limit Reached"),
            EvolutionTerminationReason::Aborted(msg) => write!(f, "Aborted: {}", msg),
        }
    }
}

/// Result of an evolutionary run.
///
/// The best individual is always reported. `tour` is present only when that
/// individual avoids every forbidden transition.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOutcome<T> {
    best_order: Vec<CityIndex>,
    best_fitness: f64,
    tour: Option<Tour<T>>,
    termination_reason: EvolutionTerminationReason,
    statistics: EvolutionStatistics,
}

impl<T> EvolutionOutcome<T> {
    #[inline]
    pub fn new(
        best_order: Vec<CityIndex>,
        best_fitness: f64,
        tour: Option<Tour<T>>,
        termination_reason: EvolutionTerminationReason,
        statistics: EvolutionStatistics,
    ) -> Self {
        Self {
            best_order,
            best_fitness,
            tour,
            termination_reason,
            statistics,
        }
    }

    /// Returns the visiting order of the best individual.
    #[inline]
    pub fn best_order(&self) -> &[CityIndex] {
        &self.best_order
    }

    /// Returns the best fitness, `INFEASIBLE_FITNESS` if no individual was
    /// feasible.
    #[inline]
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    #[inline]
    pub fn tour(&self) -> Option<&Tour<T>> {
        self.tour.as_ref()
    }

    #[inline]
    pub fn into_tour(self) -> Option<Tour<T>> {
        self.tour
    }

    #[inline]
    pub fn generations(&self) -> u64 {
        self.statistics.generations
    }

    #[inline]
    pub fn termination_reason(&self) -> &EvolutionTerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &EvolutionStatistics {
        &self.statistics
    }
}
