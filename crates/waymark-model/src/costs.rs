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

//! Edge costs as seen by a single evaluation pass.
//!
//! An `EdgeCostModel` pairs the immutable base matrix with an `effective`
//! table in which forbidden transitions carry the sentinel `T::max_value()`.
//! The effective table is built once per restriction and never edited
//! afterwards; a new mask yields a new model.

use crate::{index::CityIndex, mask::ConnectionMask, matrix::DistanceMatrix};
use num_traits::{PrimInt, Signed};
use std::sync::Arc;

/// Base distances plus an effective, possibly restricted, cost table.
#[derive(Clone)]
pub struct EdgeCostModel<T>
where
    T: PrimInt + Signed,
{
    base: Arc<DistanceMatrix<T>>,
    effective: Vec<T>,
    num_forbidden: usize,
}

impl<T> EdgeCostModel<T>
where
    T: PrimInt + Signed,
{
    /// Returns the sentinel cost marking a forbidden transition.
    #[inline(always)]
    pub fn sentinel() -> T {
        T::max_value()
    }

    /// Creates an unrestricted cost model; effective costs equal base costs.
    pub fn new(base: Arc<DistanceMatrix<T>>) -> Self {
        let effective = base.as_slice().to_vec();
        Self {
            base,
            effective,
            num_forbidden: 0,
        }
    }

    /// Creates a cost model in which every transition the mask disallows
    /// costs the sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the mask and the matrix disagree on the number of cities.
    pub fn restricted(base: Arc<DistanceMatrix<T>>, mask: &ConnectionMask) -> Self {
        let n = base.num_cities();
        assert_eq!(
            mask.num_cities(),
            n,
            "called `EdgeCostModel::restricted` with a mask over {} cities for a matrix over {} cities",
            mask.num_cities(),
            n
        );

        let sentinel = Self::sentinel();
        let mut effective = Vec::with_capacity(n * n);
        let mut num_forbidden = 0;
        for from in 0..n {
            let from_index = CityIndex::new(from);
            let row = base.row(from_index);
            for (to, &cost) in row.iter().enumerate() {
                if to != from && !mask.is_transition_allowed(from_index, CityIndex::new(to)) {
                    effective.push(sentinel);
                    num_forbidden += 1;
                } else {
                    effective.push(cost);
                }
            }
        }

        Self {
            base,
            effective,
            num_forbidden,
        }
    }

    /// Returns the number of cities.
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.base.num_cities()
    }

    /// Returns the shared base matrix.
    #[inline]
    pub fn base(&self) -> &Arc<DistanceMatrix<T>> {
        &self.base
    }

    /// Returns the number of transitions replaced by the sentinel.
    #[inline]
    pub fn num_forbidden(&self) -> usize {
        self.num_forbidden
    }

    /// Returns the effective cost of `from -> to`.
    #[inline]
    pub fn effective_cost(&self, from: CityIndex, to: CityIndex) -> T {
        let n = self.num_cities();
        debug_assert!(
            from.get() < n && to.get() < n,
            "called `EdgeCostModel::effective_cost` with ({}, {}) but the model has {} cities",
            from.get(),
            to.get(),
            n
        );

        self.effective[from.get() * n + to.get()]
    }

    /// Returns `true` if the transition `from -> to` costs the sentinel.
    #[inline]
    pub fn is_infeasible(&self, from: CityIndex, to: CityIndex) -> bool {
        self.effective_cost(from, to) == Self::sentinel()
    }

    /// Returns the effective length of the closed tour visiting `order`, the
    /// closing edge from the last city back to the first included.
    ///
    /// Returns `None` if any traversed edge is forbidden or the sum overflows.
    pub fn closed_tour_cost(&self, order: &[CityIndex]) -> Option<T> {
        let (first, last) = match (order.first(), order.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Some(T::zero()),
        };

        let closing = std::iter::once((last, first));
        let mut total = T::zero();
        for (from, to) in order.windows(2).map(|w| (w[0], w[1])).chain(closing) {
            if self.is_infeasible(from, to) {
                return None;
            }
            total = total.checked_add(&self.effective_cost(from, to))?;
        }
        Some(total)
    }
}

impl<T> std::fmt::Debug for EdgeCostModel<T>
where
    T: PrimInt + Signed,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeCostModel")
            .field("num_cities", &self.num_cities())
            .field("num_forbidden", &self.num_forbidden)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci(i: usize) -> CityIndex {
        CityIndex::new(i)
    }

    fn square() -> Arc<DistanceMatrix<i64>> {
        Arc::new(DistanceMatrix::from_rows(&[
            vec![0, 1, 5, 1],
            vec![1, 0, 1, 5],
            vec![5, 1, 0, 1],
            vec![1, 5, 1, 0],
        ]))
    }

    #[test]
    fn test_unrestricted_matches_base() {
        let model = EdgeCostModel::new(square());
        assert_eq!(model.num_forbidden(), 0);
        assert_eq!(model.effective_cost(ci(0), ci(2)), 5);
        assert_eq!(model.closed_tour_cost(&[ci(0), ci(1), ci(2), ci(3)]), Some(4));
    }

    #[test]
    fn test_restriction_uses_sentinel() {
        let mut mask = ConnectionMask::new(4);
        mask.set_transition(ci(0), ci(1), false).unwrap();

        let model = EdgeCostModel::restricted(square(), &mask);
        assert_eq!(model.num_forbidden(), 1);
        assert!(model.is_infeasible(ci(0), ci(1)));
        assert!(!model.is_infeasible(ci(1), ci(0)));
        assert_eq!(model.effective_cost(ci(0), ci(1)), i64::MAX);
        assert_eq!(model.closed_tour_cost(&[ci(0), ci(1), ci(2), ci(3)]), None);
        assert_eq!(model.closed_tour_cost(&[ci(1), ci(0), ci(3), ci(2)]), Some(4));
    }

    #[test]
    fn test_closing_edge_is_checked() {
        let mut mask = ConnectionMask::new(4);
        mask.set_transition(ci(3), ci(0), false).unwrap();

        let model = EdgeCostModel::restricted(square(), &mask);
        // Every open edge is fine, only the wrap from 3 back to 0 is forbidden.
        assert_eq!(model.closed_tour_cost(&[ci(0), ci(1), ci(2), ci(3)]), None);
    }

    #[test]
    fn test_restriction_leaves_base_untouched() {
        let base = square();
        let mut mask = ConnectionMask::new(4);
        mask.set_transition(ci(2), ci(3), false).unwrap();

        let _restricted = EdgeCostModel::restricted(Arc::clone(&base), &mask);
        assert_eq!(base.cost(ci(2), ci(3)), 1);
    }

    #[test]
    #[should_panic(expected = "called `EdgeCostModel::restricted`")]
    fn test_mismatched_mask_panics() {
        let _ = EdgeCostModel::restricted(square(), &ConnectionMask::new(3));
    }
}
