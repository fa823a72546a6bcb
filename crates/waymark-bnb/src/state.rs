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

//! Search state for the successor-domain branch and bound.
//!
//! `SearchState` holds one successor domain per city (`succ[i]`), the path
//! built so far from city 0, and the objective of that partial path. The
//! state is mutated in place by `SearchTrail` and restored on backtrack.
//!
//! Invariants (debug-checked):
//! - `path[0] == 0` and the path never repeats a city.
//! - A city has a fixed successor iff it is on the path and is not the tail,
//!   or the path is complete and it is the tail.
//! - A fixed successor's domain is a singleton.

use fixedbitset::FixedBitSet;
use num_traits::{PrimInt, Signed, Zero};
use waymark_model::{index::CityIndex, mask::SuccessorDomains, model::Model, tour::Tour};

/// The incremental state of one search run.
#[derive(Debug, Clone)]
pub struct SearchState<T> {
    domains: Vec<FixedBitSet>,
    visited: FixedBitSet,
    fixed: FixedBitSet,
    path: Vec<CityIndex>,
    current_objective: T,
    num_cities: usize,
}

impl<T> SearchState<T>
where
    T: Copy + Zero,
{
    /// Creates a state for `num_cities` cities with every domain empty
    /// and an empty path.
    #[inline]
    pub fn new(num_cities: usize) -> Self {
        Self {
            domains: vec![FixedBitSet::with_capacity(num_cities); num_cities],
            visited: FixedBitSet::with_capacity(num_cities),
            fixed: FixedBitSet::with_capacity(num_cities),
            path: Vec::with_capacity(num_cities),
            current_objective: T::zero(),
            num_cities,
        }
    }

    /// Resets the state to the root of the search for `model`: every domain
    /// holds the admissible successors of its city and the path is `[0]`.
    ///
    /// # Panics
    ///
    /// Panics if `model` has a different number of cities.
    pub fn initialize(&mut self, model: &Model<T>)
    where
        T: PrimInt + Signed,
    {
        assert_eq!(
            model.num_cities(),
            self.num_cities,
            "called `SearchState::initialize` with a model of {} cities on a state of {} cities",
            model.num_cities(),
            self.num_cities
        );

        for (city, domain) in self.domains.iter_mut().enumerate() {
            domain.clear();
            for to in model.admissible_successors(CityIndex::new(city)) {
                domain.insert(to.get());
            }
        }

        self.visited.clear();
        self.fixed.clear();
        self.path.clear();
        self.path.push(CityIndex::new(0));
        self.visited.insert(0);
        self.current_objective = T::zero();
    }
}

impl<T> SearchState<T> {
    /// Returns the number of cities.
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.num_cities
    }

    /// Returns the current successor domain of `city`.
    ///
    /// # Panics
    ///
    /// Panics if `city` is out of range.
    #[inline]
    pub fn domain(&self, city: CityIndex) -> &FixedBitSet {
        &self.domains[city.get()]
    }

    /// Returns the number of values left in the domain of `city`.
    #[inline]
    pub fn domain_size(&self, city: CityIndex) -> usize {
        self.domains[city.get()].count_ones(..)
    }

    /// Returns `true` if `to` is still in the domain of `from`.
    #[inline]
    pub fn domain_contains(&self, from: CityIndex, to: CityIndex) -> bool {
        self.domains[from.get()].contains(to.get())
    }

    /// Returns the path from city 0 to the tail.
    #[inline]
    pub fn path(&self) -> &[CityIndex] {
        &self.path
    }

    /// Returns the number of cities on the path.
    #[inline]
    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// Returns the last city on the path.
    ///
    /// # Panics
    ///
    /// Panics if the state was never initialized.
    #[inline]
    pub fn tail(&self) -> CityIndex {
        self.path[self.path.len() - 1]
    }

    /// Returns `true` once every city is on the path and the closing
    /// transition back to city 0 is fixed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.num_cities > 0 && self.fixed.count_ones(..) == self.num_cities
    }

    /// Returns `true` if `city` is already on the path.
    #[inline]
    pub fn is_visited(&self, city: CityIndex) -> bool {
        self.visited.contains(city.get())
    }

    /// Returns `true` if the successor of `city` is fixed.
    #[inline]
    pub fn has_fixed_successor(&self, city: CityIndex) -> bool {
        self.fixed.contains(city.get())
    }

    /// Returns the number of cities whose successor is fixed.
    #[inline]
    pub fn num_fixed(&self) -> usize {
        self.fixed.count_ones(..)
    }

    /// Returns the objective of the partial path, closing edge included
    /// once the path is complete.
    #[inline]
    pub fn current_objective(&self) -> T
    where
        T: Copy,
    {
        self.current_objective
    }

    /// Returns an iterator over the cities whose successor is not fixed yet.
    #[inline]
    pub fn open_cities(&self) -> impl Iterator<Item = CityIndex> + '_ {
        self.fixed.zeroes().map(CityIndex::new)
    }

    /// Returns the cheapest remaining transition out of `city` under the
    /// current domain, or `None` if the domain is empty.
    pub fn cheapest_in_domain(&self, model: &Model<T>, city: CityIndex) -> Option<T>
    where
        T: PrimInt + Signed,
    {
        self.domains[city.get()]
            .ones()
            .map(|to| model.cost(city, CityIndex::new(to)))
            .min()
    }

    #[inline]
    pub(crate) fn remove_value(&mut self, city: CityIndex, value: CityIndex) -> bool {
        let domain = &mut self.domains[city.get()];
        let present = domain.contains(value.get());
        domain.set(value.get(), false);
        present
    }

    #[inline]
    pub(crate) fn restore_value(&mut self, city: CityIndex, value: CityIndex) {
        self.domains[city.get()].insert(value.get());
    }

    #[inline]
    pub(crate) fn set_current_objective(&mut self, objective: T) {
        self.current_objective = objective;
    }

    /// Appends `to` to the path and fixes the successor of the old tail.
    pub(crate) fn extend_path(&mut self, to: CityIndex) {
        debug_assert!(
            !self.visited.contains(to.get()),
            "called `SearchState::extend_path` with city {} which is already on the path",
            to.get()
        );

        let tail = self.tail();
        self.fixed.insert(tail.get());
        self.visited.insert(to.get());
        self.path.push(to);
        if self.path.len() == self.num_cities {
            self.fixed.insert(to.get());
        }
    }

    /// Shortens the path to `len` cities, releasing every city beyond it and
    /// the successor of the new tail.
    pub(crate) fn truncate_path(&mut self, len: usize) {
        debug_assert!(
            len >= 1 && len <= self.path.len(),
            "called `SearchState::truncate_path` with length {} on a path of length {}",
            len,
            self.path.len()
        );

        for city in self.path.drain(len..) {
            self.visited.set(city.get(), false);
            self.fixed.set(city.get(), false);
        }
        if let Some(tail) = self.path.last() {
            self.fixed.set(tail.get(), false);
        }
    }
}

impl<T> SuccessorDomains for SearchState<T> {
    #[inline]
    fn num_cities(&self) -> usize {
        self.num_cities
    }

    #[inline]
    fn contains(&self, from: CityIndex, to: CityIndex) -> bool {
        self.domain_contains(from, to)
    }
}

impl<T> TryFrom<&SearchState<T>> for Tour<T>
where
    T: PrimInt + Signed,
{
    type Error = ();

    fn try_from(state: &SearchState<T>) -> Result<Self, Self::Error> {
        if !state.is_complete() {
            return Err(());
        }
        Ok(Tour::new(state.current_objective(), state.path().to_vec()))
    }
}

impl<T> std::fmt::Display for SearchState<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchState(path_len: {}, fixed: {}, objective: {})",
            self.path.len(),
            self.fixed.count_ones(..),
            self.current_objective
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waymark_model::{matrix::DistanceMatrix, model::ModelBuilder};

    fn c(i: usize) -> CityIndex {
        CityIndex::new(i)
    }

    fn model(n: usize) -> Model<i64> {
        let mut costs = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                costs.push(if i == j { 0 } else { (i + j) as i64 });
            }
        }
        ModelBuilder::new(Arc::new(DistanceMatrix::from_flat(n, costs))).build()
    }

    #[test]
    fn test_initialize_fills_domains_from_model() {
        let m = model(4);
        let mut s = SearchState::<i64>::new(4);
        s.initialize(&m);

        assert_eq!(s.path(), &[c(0)]);
        assert_eq!(s.tail(), c(0));
        assert!(s.is_visited(c(0)));
        assert_eq!(s.num_fixed(), 0);
        for i in 0..4 {
            assert_eq!(s.domain_size(c(i)), 3);
            assert!(!s.domain_contains(c(i), c(i)));
        }
    }

    #[test]
    fn test_initialize_respects_forbidden_transitions() {
        let matrix = Arc::new(DistanceMatrix::<i64>::from_rows(&[
            vec![0, 1, 1],
            vec![1, 0, 1],
            vec![1, 1, 0],
        ]));
        let mut builder = ModelBuilder::new(matrix);
        builder.forbid_transition(c(0), c(2));
        let m = builder.build();

        let mut s = SearchState::<i64>::new(3);
        s.initialize(&m);
        assert!(!s.domain_contains(c(0), c(2)));
        assert!(s.domain_contains(c(2), c(0)));
        assert!(SuccessorDomains::contains(&s, c(0), c(1)));
    }

    #[test]
    fn test_extend_and_truncate_path_restore_flags() {
        let m = model(3);
        let mut s = SearchState::<i64>::new(3);
        s.initialize(&m);

        s.extend_path(c(2));
        assert_eq!(s.tail(), c(2));
        assert!(s.has_fixed_successor(c(0)));
        assert!(!s.has_fixed_successor(c(2)));

        s.extend_path(c(1));
        assert!(s.is_complete());
        assert_eq!(s.open_cities().count(), 0);

        s.truncate_path(1);
        assert_eq!(s.path(), &[c(0)]);
        assert_eq!(s.num_fixed(), 0);
        assert!(!s.is_visited(c(1)));
        assert!(!s.is_visited(c(2)));
    }

    #[test]
    fn test_cheapest_in_domain_tracks_removals() {
        let m = model(4);
        let mut s = SearchState::<i64>::new(4);
        s.initialize(&m);

        // Costs out of 0 are 1, 2, 3 for successors 1, 2, 3.
        assert_eq!(s.cheapest_in_domain(&m, c(0)), Some(1));
        assert!(s.remove_value(c(0), c(1)));
        assert!(!s.remove_value(c(0), c(1)));
        assert_eq!(s.cheapest_in_domain(&m, c(0)), Some(2));
        s.restore_value(c(0), c(1));
        assert_eq!(s.cheapest_in_domain(&m, c(0)), Some(1));
    }

    #[test]
    fn test_tour_conversion_requires_complete_path() {
        let m = model(3);
        let mut s = SearchState::<i64>::new(3);
        s.initialize(&m);
        assert!(Tour::try_from(&s).is_err());

        s.extend_path(c(1));
        s.extend_path(c(2));
        s.set_current_objective(6);
        let tour = Tour::try_from(&s).unwrap();
        assert_eq!(tour.objective_value(), 6);
        assert_eq!(tour.order(), &[c(0), c(1), c(2)]);
    }
}
