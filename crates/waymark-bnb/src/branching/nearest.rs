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
    branching::decision::{BufferedDecisionIter, Decision, DecisionBuilder, collect_candidates},
    state::SearchState,
};
use num_traits::{PrimInt, Signed};
use waymark_model::model::Model;

/// A decision builder that explores the **nearest successor first**.
///
/// All feasible successors of the tail are generated and sorted by cost
/// delta, most expensive first, so that the cheapest transition ends up on
/// top of the stack. Ties are broken by city index, lower index first.
///
/// Greedy ordering finds a good first tour quickly, which tightens the
/// bound early.
#[derive(Debug, Clone, Default)]
pub struct NearestNeighborBuilder<T> {
    candidates: Vec<Decision<T>>,
}

impl<T> NearestNeighborBuilder<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    #[inline]
    pub fn preallocated(num_cities: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(num_cities),
        }
    }
}

impl<T> DecisionBuilder<T> for NearestNeighborBuilder<T>
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>
        = BufferedDecisionIter<'a, T>
    where
        T: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "NearestNeighborBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        collect_candidates(&mut self.candidates, model, state);
        self.candidates.sort_unstable_by(|a, b| {
            b.cost_delta()
                .cmp(&a.cost_delta())
                .then_with(|| b.to().cmp(&a.to()))
        });
        BufferedDecisionIter::new(&self.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waymark_model::{matrix::DistanceMatrix, model::ModelBuilder};

    #[test]
    fn test_cheapest_successor_is_yielded_last() {
        let matrix = DistanceMatrix::<i64>::from_rows(&[
            vec![0, 7, 3, 3, 9],
            vec![1, 0, 1, 1, 1],
            vec![1, 1, 0, 1, 1],
            vec![1, 1, 1, 0, 1],
            vec![1, 1, 1, 1, 0],
        ]);
        let model = ModelBuilder::new(Arc::new(matrix)).build();
        let mut state = SearchState::new(5);
        state.initialize(&model);

        let mut builder = NearestNeighborBuilder::preallocated(5);
        let order: Vec<usize> = builder
            .next_decision(&model, &state)
            .map(|d| d.to().get())
            .collect();

        assert_eq!(order, vec![4, 1, 3, 2]);
        assert_eq!(
            DecisionBuilder::<i64>::name(&builder),
            "NearestNeighborBuilder"
        );
        assert!(order.iter().all(|&to| to != 0));
    }
}
