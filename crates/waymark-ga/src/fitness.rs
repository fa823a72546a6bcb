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

//! Permutation fitness.
//!
//! The engine minimizes a `PermutationFitness`. The shipped implementation,
//! `ClosedTourFitness`, prices a chromosome as the length of the closed tour
//! it describes under an `EdgeCostModel`'s effective costs. Any forbidden
//! edge, the closing edge from the last city back to the first included,
//! makes the whole tour worth `INFEASIBLE_FITNESS`.

use num_traits::{PrimInt, Signed, ToPrimitive};
use waymark_model::{costs::EdgeCostModel, index::CityIndex};

/// Fitness of a tour that uses a forbidden transition.
///
/// Strictly greater than the fitness of any tour that avoids forbidden
/// transitions, and equal to the coordination layer's unbounded distance so
/// such reports never count as improvements.
pub const INFEASIBLE_FITNESS: f64 = f64::MAX;

/// A minimization objective over permutations of `0..num_cities()`.
pub trait PermutationFitness {
    /// The exact objective type.
    type Objective: PrimInt + Signed;

    /// Returns the genome length.
    fn num_cities(&self) -> usize;

    /// Returns the exact objective, or `None` if the permutation is infeasible.
    fn objective(&self, genes: &[CityIndex]) -> Option<Self::Objective>;

    /// Returns the objective as a fitness value.
    fn evaluate(&self, genes: &[CityIndex]) -> f64 {
        self.objective(genes)
            .and_then(|value| value.to_f64())
            .unwrap_or(INFEASIBLE_FITNESS)
    }
}

/// Closed tour length under an `EdgeCostModel`.
#[derive(Debug, Clone, Copy)]
pub struct ClosedTourFitness<'a, T>
where
    T: PrimInt + Signed,
{
    costs: &'a EdgeCostModel<T>,
}

impl<'a, T> ClosedTourFitness<'a, T>
where
    T: PrimInt + Signed,
{
    #[inline]
    pub fn new(costs: &'a EdgeCostModel<T>) -> Self {
        Self { costs }
    }

    #[inline]
    pub fn costs(&self) -> &EdgeCostModel<T> {
        self.costs
    }
}

impl<'a, T> PermutationFitness for ClosedTourFitness<'a, T>
where
    T: PrimInt + Signed,
{
    type Objective = T;

    #[inline]
    fn num_cities(&self) -> usize {
        self.costs.num_cities()
    }

    #[inline]
    fn objective(&self, genes: &[CityIndex]) -> Option<T> {
        debug_assert_eq!(
            genes.len(),
            self.costs.num_cities(),
            "called `ClosedTourFitness::objective` with {} genes for {} cities",
            genes.len(),
            self.costs.num_cities()
        );

        self.costs.closed_tour_cost(genes)
    }
}
