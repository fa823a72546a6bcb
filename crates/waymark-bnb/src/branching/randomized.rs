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
use rand::{Rng, seq::SliceRandom};
use waymark_model::model::Model;

/// A decision builder that explores successors in a **random order**
/// drawn from its own generator.
///
/// Seeding the generator makes the order reproducible; portfolio workers use
/// distinct seeds so that they explore different parts of the tree.
#[derive(Debug, Clone)]
pub struct RandomizedBuilder<T, R> {
    candidates: Vec<Decision<T>>,
    rng: R,
}

impl<T, R> RandomizedBuilder<T, R>
where
    R: Rng,
{
    #[inline]
    pub fn new(rng: R) -> Self {
        Self {
            candidates: Vec::new(),
            rng,
        }
    }

    #[inline]
    pub fn preallocated(num_cities: usize, rng: R) -> Self {
        Self {
            candidates: Vec::with_capacity(num_cities),
            rng,
        }
    }
}

impl<T, R> DecisionBuilder<T> for RandomizedBuilder<T, R>
where
    T: PrimInt + Signed,
    R: Rng,
{
    type DecisionIterator<'a>
        = BufferedDecisionIter<'a, T>
    where
        T: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "RandomizedBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        collect_candidates(&mut self.candidates, model, state);
        self.candidates.shuffle(&mut self.rng);
        BufferedDecisionIter::new(&self.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;
    use waymark_model::{matrix::DistanceMatrix, model::ModelBuilder};

    fn model(n: usize) -> Model<i64> {
        let costs = (0..n * n)
            .map(|k| if k / n == k % n { 0 } else { (k % 7) as i64 + 1 })
            .collect();
        ModelBuilder::new(Arc::new(DistanceMatrix::from_flat(n, costs))).build()
    }

    fn order(seed: u64, model: &Model<i64>, state: &SearchState<i64>) -> Vec<usize> {
        let mut builder = RandomizedBuilder::preallocated(8, ChaCha8Rng::seed_from_u64(seed));
        builder
            .next_decision(model, state)
            .map(|d| d.to().get())
            .collect()
    }

    #[test]
    fn test_same_seed_same_order() {
        let m = model(8);
        let mut s = SearchState::new(8);
        s.initialize(&m);
        assert_eq!(order(7, &m, &s), order(7, &m, &s));
    }

    #[test]
    fn test_order_is_a_permutation_of_the_domain() {
        let m = model(8);
        let mut s = SearchState::new(8);
        s.initialize(&m);
        let mut got = order(42, &m, &s);
        got.sort_unstable();
        assert_eq!(got, (1..8).collect::<Vec<_>>());
    }
}
