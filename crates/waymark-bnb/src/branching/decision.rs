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

use crate::state::SearchState;
use num_traits::{PrimInt, Signed};
use std::iter::FusedIterator;
use waymark_model::{index::CityIndex, model::Model};

/// A decision to fix the successor of `from` to `to`, along with the
/// objective increase it causes.
///
/// When `to` is the last unvisited city the closing transition back to
/// city 0 is already included in `cost_delta`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decision<T> {
    cost_delta: T,
    from: CityIndex,
    to: CityIndex,
}

impl<T> std::fmt::Display for Decision<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decision(from: {}, to: {}, cost_delta: {})",
            self.from.get(),
            self.to.get(),
            self.cost_delta
        )
    }
}

impl<T: Ord> Ord for Decision<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.from
            .cmp(&other.from)
            .then(self.to.cmp(&other.to))
            .then(self.cost_delta.cmp(&other.cost_delta))
    }
}

impl<T: Ord> PartialOrd for Decision<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Decision<T>
where
    T: Copy,
{
    /// Creates a decision without any feasibility checks.
    #[inline]
    pub fn new(from: CityIndex, to: CityIndex, cost_delta: T) -> Self {
        Self {
            cost_delta,
            from,
            to,
        }
    }

    #[inline]
    pub fn from(&self) -> CityIndex {
        self.from
    }

    #[inline]
    pub fn to(&self) -> CityIndex {
        self.to
    }

    #[inline]
    pub fn cost_delta(&self) -> T {
        self.cost_delta
    }
}

impl<T> Decision<T>
where
    T: PrimInt + Signed,
{
    /// Tries to create the decision `succ[tail] = to` for the current
    /// state.
    ///
    /// Returns `None` if `to` is not in the domain of the tail, if `to`
    /// would complete the path but cannot return to city 0, or if the cost
    /// overflows `T`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `to` is out of range.
    #[inline]
    pub fn try_new(to: CityIndex, model: &Model<T>, state: &SearchState<T>) -> Option<Self> {
        let num_cities = model.num_cities();
        debug_assert!(
            to.get() < num_cities,
            "called `Decision::try_new` with city index out of bounds: the len is {} but the index is {}",
            num_cities,
            to.get()
        );

        let from = state.tail();
        if state.has_fixed_successor(from) || !state.domain_contains(from, to) {
            return None;
        }

        let step = model.cost(from, to);
        let cost_delta = if state.path_len() + 1 == num_cities {
            let origin = CityIndex::new(0);
            if !state.domain_contains(to, origin) {
                return None;
            }
            step.checked_add(&model.cost(to, origin))?
        } else {
            step
        };

        Some(Self {
            cost_delta,
            from,
            to,
        })
    }
}

/// A strategy that orders the successor candidates of the current tail.
///
/// The session pops decisions last-in first-out, so a builder yields its
/// most promising decision **last**.
pub trait DecisionBuilder<T>
where
    T: PrimInt + Signed,
{
    type DecisionIterator<'a>: Iterator<Item = Decision<T>> + FusedIterator + 'a
    where
        Self: 'a,
        T: 'a;

    fn name(&self) -> &str;

    fn next_decision<'a>(
        &'a mut self,
        model: &'a Model<T>,
        search_state: &'a SearchState<T>,
    ) -> Self::DecisionIterator<'a>;
}

/// Collects every feasible decision of the current tail into `buffer`.
pub(crate) fn collect_candidates<T>(
    buffer: &mut Vec<Decision<T>>,
    model: &Model<T>,
    state: &SearchState<T>,
) where
    T: PrimInt + Signed,
{
    buffer.clear();
    let tail = state.tail();
    buffer.extend(
        state
            .domain(tail)
            .ones()
            .filter_map(|to| Decision::try_new(CityIndex::new(to), model, state)),
    );
}

/// An iterator over a builder's buffered, already ordered candidates.
#[derive(Debug, Clone)]
pub struct BufferedDecisionIter<'a, T> {
    iter: std::slice::Iter<'a, Decision<T>>,
}

impl<'a, T> BufferedDecisionIter<'a, T> {
    #[inline]
    pub(crate) fn new(candidates: &'a [Decision<T>]) -> Self {
        Self {
            iter: candidates.iter(),
        }
    }
}

impl<'a, T> Iterator for BufferedDecisionIter<'a, T>
where
    T: Copy,
{
    type Item = Decision<T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().copied()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, T> FusedIterator for BufferedDecisionIter<'a, T> where T: Copy {}
