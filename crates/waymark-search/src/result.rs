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

use crate::stats::SolverStatistics;
use num_traits::{PrimInt, Signed};
use waymark_model::tour::Tour;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult<T> {
    /// We have proven that no tour below the ceiling exists.
    Infeasible,
    /// We have found a tour and proven its optimality.
    Optimal(Tour<T>),
    /// We have found a tour, but not proven its optimality.
    Feasible(Tour<T>),
    /// The solver terminated without finding a tour and
    /// without proving infeasibility.
    Unknown,
}

impl<T> SolverResult<T> {
    /// Returns the tour carried by this result, if any.
    #[inline]
    pub fn tour(&self) -> Option<&Tour<T>> {
        match self {
            SolverResult::Optimal(tour) | SolverResult::Feasible(tour) => Some(tour),
            _ => None,
        }
    }
}

impl<T> std::fmt::Display for SolverResult<T>
where
    T: PrimInt + Signed + Copy + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(tour) => {
                write!(f, "Optimal(objective={})", tour.objective_value())
            }
            SolverResult::Feasible(tour) => {
                write!(f, "Feasible(objective={})", tour.objective_value())
            }
            SolverResult::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The solver found and proved optimality of a tour.
    OptimalityProven,
    /// The solver proved that no tour below the ceiling exists.
    InfeasibilityProven,
    /// The solver aborted due to a search limit (time, solutions, interrupt).
    /// The string describes the reason.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutcome<T> {
    result: SolverResult<T>,
    reason: TerminationReason,
    statistics: SolverStatistics,
}

impl<T> SolverOutcome<T>
where
    T: PrimInt + Signed + Copy,
{
    #[inline]
    pub fn new(
        result: SolverResult<T>,
        reason: TerminationReason,
        statistics: SolverStatistics,
    ) -> Self {
        Self {
            result,
            reason,
            statistics,
        }
    }

    #[inline]
    pub fn optimal(tour: Tour<T>, statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Optimal(tour),
            TerminationReason::OptimalityProven,
            statistics,
        )
    }

    #[inline]
    pub fn feasible<R>(tour: Tour<T>, reason: R, statistics: SolverStatistics) -> Self
    where
        R: Into<String>,
    {
        Self::new(
            SolverResult::Feasible(tour),
            TerminationReason::Aborted(reason.into()),
            statistics,
        )
    }

    #[inline]
    pub fn infeasible(statistics: SolverStatistics) -> Self {
        Self::new(
            SolverResult::Infeasible,
            TerminationReason::InfeasibilityProven,
            statistics,
        )
    }

    #[inline]
    pub fn unknown<R>(reason: R, statistics: SolverStatistics) -> Self
    where
        R: Into<String>,
    {
        Self::new(
            SolverResult::Unknown,
            TerminationReason::Aborted(reason.into()),
            statistics,
        )
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn reason(&self) -> &TerminationReason {
        &self.reason
    }

    #[inline]
    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }

    #[inline]
    pub fn has_solution(&self) -> bool {
        self.result.tour().is_some()
    }
}

impl<T> std::fmt::Display for SolverOutcome<T>
where
    T: PrimInt + Signed + Copy + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.reason)?;
        write!(f, "{}", self.statistics)
    }
}
