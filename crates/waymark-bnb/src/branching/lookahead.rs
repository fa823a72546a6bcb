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
    branching::decision::{BufferedDecisionIter, Decision, DecisionBuilder},
    state::SearchState,
};
use num_traits::{PrimInt, Signed};
use waymark_model::{index::CityIndex, model::Model};

/// Internal candidate carrying its look-ahead score.
#[derive(Debug, Clone, Copy)]
struct ScoredCandidate<T> {
    score: T,
    decision: Decision<T>,
}

/// A decision builder with a **one-step look-ahead**.
///
/// Each candidate `tail -> to` is scored by its cost delta plus the cheapest
/// transition that could leave `to` afterwards. Candidates with no possible
/// continuation are dropped, since they lead to an empty domain.
/// The lowest score is yielded last.
#[derive(Debug, Clone, Default)]
pub struct LookaheadBuilder<T> {
    scored: Vec<ScoredCandidate<T>>,
    candidates: Vec<Decision<T>>,
}

impl<T> LookaheadBuilder<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            scored: Vec::new(),
            candidates: Vec::new(),
        }
    }

    #[inline]
    pub fn preallocated(num_cities: usize) -> Self {
        Self {
            scored: Vec::with_capacity(num_cities),
            candidates: Vec::with_capacity(num_cities),
        }
    }
}

/// Returns the cheapest continuation out of `to` once it joined the path,
/// or `None` if there is none.
fn cheapest_continuation<T>(model: &Model<T>, state: &SearchState<T>, to: CityIndex) -> Option<T>
where
    T: PrimInt + Signed,
{
    state
        .domain(to)
        .ones()
        .filter(|&next| next != 0 && !state.is_visited(CityIndex::new(next)))
        .map(|next| model.cost(to, CityIndex::new(next)))
        .min()
}

impl<T> DecisionBuilder<T> for LookaheadBuilder<T>
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>
        = BufferedDecisionIter<'a, T>
    where
        T: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "LookaheadBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        self.scored.clear();
        self.candidates.clear();

        let tail = state.tail();
        let completes = state.path_len() + 1 == model.num_cities();
        for to in state.domain(tail).ones().map(CityIndex::new) {
            let Some(decision) = Decision::try_new(to, model, state) else {
                continue;
            };

            let score = if completes {
                decision.cost_delta()
            } else {
                match cheapest_continuation(model, state, to) {
                    Some(next) => decision.cost_delta().saturating_add(next),
                    None => continue,
                }
            };
            self.scored.push(ScoredCandidate { score, decision });
        }

        self.scored.sort_unstable_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.decision.to().cmp(&a.decision.to()))
        });
        self.candidates
            .extend(self.scored.iter().map(|candidate| candidate.decision));
        BufferedDecisionIter::new(&self.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waymark_model::{matrix::DistanceMatrix, model::ModelBuilder};

    #[test]
    fn test_prefers_cheap_continuation_over_cheap_edge() {
        // 0 -> 1 is cheap but 1 only continues expensively;
        // 0 -> 2 is pricier but continues cheaply.
        let matrix = DistanceMatrix::<i64>::from_rows(&[
            vec![0, 1, 3, 50],
            vec![1, 0, 40, 40],
            vec![1, 1, 0, 1],
            vec![1, 1, 1, 0],
        ]);
        let model = ModelBuilder::new(Arc::new(matrix)).build();
        let mut state = SearchState::new(4);
        state.initialize(&model);

        let mut builder = LookaheadBuilder::preallocated(4);
        let order: Vec<usize> = builder
            .next_decision(&model, &state)
            .map(|d| d.to().get())
            .collect();

        // scores: to 1 -> 1 + 40, to 2 -> 3 + 1, to 3 -> 50 + 1
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_drops_candidates_without_continuation() {
        let matrix = DistanceMatrix::<i64>::from_rows(&[
            vec![0, 1, 1],
            vec![1, 0, 1],
            vec![1, 1, 0],
        ]);
        let mut builder_model = ModelBuilder::new(Arc::new(matrix));
        builder_model.forbid_transition(CityIndex::new(1), CityIndex::new(2));
        let model = builder_model.build();
        let mut state = SearchState::new(3);
        state.initialize(&model);

        let mut builder = LookaheadBuilder::new();
        let order: Vec<usize> = builder
            .next_decision(&model, &state)
            .map(|d| d.to().get())
            .collect();
        assert_eq!(order, vec![2]);
    }
}
