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

use crate::stats::BnbSolverStatistics;
use num_traits::{PrimInt, Signed};
use waymark_model::tour::Tour;
use waymark_search::{
    portfolio::PortfolioSolverResult,
    result::{SolverResult, TerminationReason},
};

/// Why a branch and bound run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BnbTerminationReason {
    OptimalityProven,
    InfeasibilityProven,
    Aborted(String),
}

impl std::fmt::Display for BnbTerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BnbTerminationReason::OptimalityProven => write!(f, "OptimalityProven"),
            BnbTerminationReason::InfeasibilityProven => write!(f, "InfeasibilityProven"),
            BnbTerminationReason::Aborted(msg) => write!(f, "Aborted({})", msg),
        }
    }
}

/// Result of the solver after termination.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome<T> {
    result: SolverResult<T>,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics,
}

impl<T> BnbSolverOutcome<T> {
    #[inline]
    pub fn optimal(tour: Tour<T>, statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Optimal(tour),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            statistics,
        }
    }

    /// An aborted run. Without a tour nothing was proven, so the result is
    /// `Unknown`.
    #[inline]
    pub fn aborted<R>(tour: Option<Tour<T>>, reason: R, statistics: BnbSolverStatistics) -> Self
    where
        R: Into<String>,
    {
        let result = match tour {
            Some(tour) => SolverResult::Feasible(tour),
            None => SolverResult::Unknown,
        };

        Self {
            result,
            termination_reason: TerminationReason::Aborted(reason.into()),
            statistics,
        }
    }

    #[inline]
    pub fn result(&self) -> &SolverResult<T> {
        &self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    /// Returns the best tour of the run, if any.
    #[inline]
    pub fn tour(&self) -> Option<&Tour<T>> {
        self.result.tour()
    }
}

impl<T> From<BnbSolverOutcome<T>> for PortfolioSolverResult<T>
where
    T: PrimInt + Signed,
{
    fn from(val: BnbSolverOutcome<T>) -> Self {
        match val.termination_reason {
            TerminationReason::OptimalityProven => {
                assert!(
                    matches!(val.result, SolverResult::Optimal(_)),
                    "called `BnbSolverOutcome::into()` with inconsistent state: termination reason is OptimalityProven but result is not Optimal"
                );
                match val.result {
                    SolverResult::Optimal(tour) => PortfolioSolverResult::optimal(tour),
                    _ => PortfolioSolverResult::infeasible(),
                }
            }
            TerminationReason::InfeasibilityProven => PortfolioSolverResult::infeasible(),
            TerminationReason::Aborted(reason) => match val.result {
                SolverResult::Feasible(tour) => PortfolioSolverResult::aborted(Some(tour), reason),
                _ => PortfolioSolverResult::aborted(None, reason),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_model::index::CityIndex;

    type I = i64;

    fn tour(objective: I) -> Tour<I> {
        Tour::new(objective, (0..3).map(CityIndex::new).collect())
    }

    #[test]
    fn test_into_portfolio_infeasible_maps_correctly() {
        let outcome = BnbSolverOutcome::<I>::infeasible(BnbSolverStatistics::default());
        let portfolio: PortfolioSolverResult<I> = outcome.into();
        assert!(matches!(portfolio.result(), SolverResult::Infeasible));
        assert!(matches!(
            portfolio.termination_reason(),
            TerminationReason::InfeasibilityProven
        ));
    }

    #[test]
    fn test_into_portfolio_optimal_keeps_tour() {
        let outcome = BnbSolverOutcome::optimal(tour(12), BnbSolverStatistics::default());
        assert_eq!(outcome.tour().map(|t| t.objective_value()), Some(12));
        let portfolio: PortfolioSolverResult<I> = outcome.into();
        match portfolio.result() {
            SolverResult::Optimal(t) => assert_eq!(t.objective_value(), 12),
            other => panic!("expected Optimal, got {:?}", other),
        }
    }

    #[test]
    fn test_aborted_without_tour_is_unknown() {
        let outcome =
            BnbSolverOutcome::<I>::aborted(None, "time limit", BnbSolverStatistics::default());
        assert!(matches!(outcome.result(), SolverResult::Unknown));
        let portfolio: PortfolioSolverResult<I> = outcome.into();
        match portfolio.termination_reason() {
            TerminationReason::Aborted(msg) => assert_eq!(msg, "time limit"),
            other => panic!("expected Aborted, got {:?}", other),
        }
    }

    #[test]
    fn test_aborted_with_tour_is_feasible() {
        let outcome =
            BnbSolverOutcome::aborted(Some(tour(9)), "stop", BnbSolverStatistics::default());
        let portfolio: PortfolioSolverResult<I> = outcome.into();
        assert!(matches!(portfolio.result(), SolverResult::Feasible(_)));
    }

    #[test]
    #[should_panic(expected = "termination reason is OptimalityProven but result is not Optimal")]
    fn test_into_portfolio_optimality_invariant_panics_on_inconsistent_state() {
        let inconsistent = BnbSolverOutcome::<I> {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::OptimalityProven,
            statistics: BnbSolverStatistics::default(),
        };
        let _portfolio: PortfolioSolverResult<I> = inconsistent.into();
    }
}
