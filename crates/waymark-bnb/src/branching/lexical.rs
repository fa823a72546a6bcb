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
    branching::decision::{Decision, DecisionBuilder},
    state::SearchState,
};
use num_traits::{PrimInt, Signed};
use std::iter::FusedIterator;
use waymark_model::{index::CityIndex, model::Model};

/// A decision builder that explores successors in **ascending city index**.
///
/// Candidates are produced lazily, highest index first, so that the lowest
/// index is popped first. No buffer is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IndexOrderBuilder;

impl<T> DecisionBuilder<T> for IndexOrderBuilder
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>
        = IndexOrderIter<'a, T>
    where
        T: 'a,
        Self: 'a;

    fn name(&self) -> &str {
        "IndexOrderBuilder"
    }

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a> {
        IndexOrderIter {
            remaining: model.num_cities(),
            model,
            state,
        }
    }
}

/// Iterator over the feasible successors of the tail in descending index
/// order.
#[derive(Debug)]
pub struct IndexOrderIter<'a, T>
where
    T: PrimInt + Signed,
{
    remaining: usize,
    model: &'a Model<T>,
    state: &'a SearchState<T>,
}

impl<'a, T> Iterator for IndexOrderIter<'a, T>
where
    T: PrimInt + Signed,
{
    type Item = Decision<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            self.remaining -= 1;
            let to = CityIndex::new(self.remaining);
            if let Some(decision) = Decision::try_new(to, self.model, self.state) {
                return Some(decision);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a, T> FusedIterator for IndexOrderIter<'a, T> where T: PrimInt + Signed {}
