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

use crate::{index::CityIndex, mask::ConnectionMask, matrix::DistanceMatrix};
use fixedbitset::FixedBitSet;
use num_traits::{PrimInt, Signed};
use std::sync::Arc;

#[inline(always)]
fn flatten_index(num_cities: usize, from: CityIndex, to: CityIndex) -> usize {
    from.get() * num_cities + to.get()
}

/// An immutable TSP instance as consumed by the exact search.
///
/// This struct holds all pre-validated, queryable data:
/// - `matrix`: the shared base distance matrix.
/// - `forbidden[from * num_cities + to]`: transitions the search may never use.
///   Self transitions are always forbidden.
/// - `cheapest_outgoing[city]`: the minimum cost over the admissible
///   successors of `city`, or `None` if the city has none.
/// - `ceiling`: an optional strict upper bound on the tour length.
///
/// Construction:
/// - Use `ModelBuilder` and call `ModelBuilder::build` to obtain a validated `Model`.
#[derive(Clone)]
pub struct Model<T>
where
    T: PrimInt + Signed,
{
    matrix: Arc<DistanceMatrix<T>>,
    forbidden: FixedBitSet,               // len = num_cities * num_cities
    cheapest_outgoing: Vec<Option<T>>,    // len = num_cities
    ceiling: Option<T>,
}

impl<T> Model<T>
where
    T: PrimInt + Signed,
{
    /// Returns the number of cities in the model.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use waymark_model::{matrix::DistanceMatrix, model::ModelBuilder};
    ///
    /// let matrix = DistanceMatrix::<i64>::from_rows(&[vec![0, 1], vec![1, 0]]);
    /// let model = ModelBuilder::new(Arc::new(matrix)).build();
    /// assert_eq!(model.num_cities(), 2);
    /// ```
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.matrix.num_cities()
    }

    /// Returns the shared base matrix.
    #[inline]
    pub fn matrix(&self) -> &Arc<DistanceMatrix<T>> {
        &self.matrix
    }

    /// Returns the strict upper bound on the tour length, if any.
    #[inline]
    pub fn ceiling(&self) -> Option<T> {
        self.ceiling
    }

    /// Returns the base cost of `from -> to`.
    #[inline]
    pub fn cost(&self, from: CityIndex, to: CityIndex) -> T {
        self.matrix.cost(from, to)
    }

    /// Returns `true` if the search may use the transition `from -> to`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if either index is out of range.
    #[inline]
    pub fn is_transition_allowed(&self, from: CityIndex, to: CityIndex) -> bool {
        let n = self.num_cities();
        debug_assert!(
            from.get() < n && to.get() < n,
            "called `Model::is_transition_allowed` with ({}, {}) but the model has {} cities",
            from.get(),
            to.get(),
            n
        );

        !self.forbidden.contains(flatten_index(n, from, to))
    }

    /// Returns the cheapest admissible outgoing cost of `city`, or `None`
    /// if every transition out of `city` is forbidden.
    #[inline]
    pub fn cheapest_outgoing(&self, city: CityIndex) -> Option<T> {
        self.cheapest_outgoing[city.get()]
    }

    /// Returns an iterator over the admissible successors of `city`.
    pub fn admissible_successors(&self, city: CityIndex) -> impl Iterator<Item = CityIndex> + '_ {
        (0..self.num_cities())
            .map(CityIndex::new)
            .filter(move |&to| self.is_transition_allowed(city, to))
    }

    /// Returns the number of forbidden transitions, self transitions excluded.
    #[inline]
    pub fn num_forbidden(&self) -> usize {
        self.forbidden.count_ones(..) - self.num_cities()
    }
}

impl<T> std::fmt::Debug for Model<T>
where
    T: PrimInt + Signed + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("num_cities", &self.num_cities())
            .field("num_forbidden", &self.num_forbidden())
            .field("ceiling", &self.ceiling)
            .finish()
    }
}

impl<T> std::fmt::Display for Model<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ceiling {
            Some(c) => write!(f, "Model(num_cities: {}, ceiling: {})", self.num_cities(), c),
            None => write!(f, "Model(num_cities: {}, ceiling: none)", self.num_cities()),
        }
    }
}

/// Mutable configuration for a `Model`.
///
/// The builder starts with every transition except self loops admissible
/// and no ceiling. Restrictions are added by forbidding transitions.
#[derive(Clone)]
pub struct ModelBuilder<T>
where
    T: PrimInt + Signed,
{
    matrix: Arc<DistanceMatrix<T>>,
    forbidden: FixedBitSet,
    ceiling: Option<T>,
}

impl<T> ModelBuilder<T>
where
    T: PrimInt + Signed,
{
    /// Creates a new builder over the given matrix.
    ///
    /// # Panics
    ///
    /// Panics if the matrix has fewer than two cities.
    pub fn new(matrix: Arc<DistanceMatrix<T>>) -> Self {
        let n = matrix.num_cities();
        assert!(
            n >= 2,
            "called `ModelBuilder::new` with {} cities, but a tour needs at least 2",
            n
        );

        let mut forbidden = FixedBitSet::with_capacity(n * n);
        for i in 0..n {
            forbidden.insert(i * n + i);
        }

        Self {
            matrix,
            forbidden,
            ceiling: None,
        }
    }

    /// Returns the number of cities.
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.matrix.num_cities()
    }

    /// Forbids the transition `from -> to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn forbid_transition(&mut self, from: CityIndex, to: CityIndex) -> &mut Self {
        let n = self.num_cities();
        assert!(
            from.get() < n && to.get() < n,
            "called `ModelBuilder::forbid_transition` with ({}, {}) but the model has {} cities",
            from.get(),
            to.get(),
            n
        );

        self.forbidden.insert(flatten_index(n, from, to));
        self
    }

    /// Forbids every transition the mask disallows.
    ///
    /// # Panics
    ///
    /// Panics if the mask covers a different number of cities.
    pub fn with_forbidden_from_mask(&mut self, mask: &ConnectionMask) -> &mut Self {
        let n = self.num_cities();
        assert_eq!(
            mask.num_cities(),
            n,
            "called `ModelBuilder::with_forbidden_from_mask` with a mask over {} cities for a model over {} cities",
            mask.num_cities(),
            n
        );

        for from in (0..n).map(CityIndex::new) {
            for to in (0..n).map(CityIndex::new) {
                if from != to && !mask.is_transition_allowed(from, to) {
                    self.forbidden.insert(flatten_index(n, from, to));
                }
            }
        }
        self
    }

    /// Sets a strict upper bound on the tour length.
    #[inline]
    pub fn with_ceiling(&mut self, ceiling: T) -> &mut Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// Sets or clears the ceiling.
    #[inline]
    pub fn with_optional_ceiling(&mut self, ceiling: Option<T>) -> &mut Self {
        self.ceiling = ceiling;
        self
    }

    /// Builds the `Model`.
    pub fn build(self) -> Model<T> {
        let n = self.matrix.num_cities();
        let cheapest_outgoing = (0..n)
            .map(|from| {
                let from = CityIndex::new(from);
                (0..n)
                    .map(CityIndex::new)
                    .filter(|&to| !self.forbidden.contains(flatten_index(n, from, to)))
                    .map(|to| self.matrix.cost(from, to))
                    .min()
            })
            .collect();

        Model {
            matrix: self.matrix,
            forbidden: self.forbidden,
            cheapest_outgoing,
            ceiling: self.ceiling,
        }
    }
}

impl<T> std::fmt::Debug for ModelBuilder<T>
where
    T: PrimInt + Signed + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("num_cities", &self.num_cities())
            .field("ceiling", &self.ceiling)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci(i: usize) -> CityIndex {
        CityIndex::new(i)
    }

    fn matrix() -> Arc<DistanceMatrix<i64>> {
        Arc::new(DistanceMatrix::from_rows(&[
            vec![0, 4, 2],
            vec![3, 0, 9],
            vec![1, 8, 0],
        ]))
    }

    #[test]
    fn test_defaults_forbid_only_self_loops() {
        let model = ModelBuilder::new(matrix()).build();
        assert_eq!(model.num_cities(), 3);
        assert_eq!(model.ceiling(), None);
        assert_eq!(model.num_forbidden(), 0);
        for i in 0..3 {
            assert!(!model.is_transition_allowed(ci(i), ci(i)));
        }
        assert_eq!(model.cheapest_outgoing(ci(0)), Some(2));
        assert_eq!(model.cheapest_outgoing(ci(1)), Some(3));
    }

    #[test]
    fn test_forbid_updates_cheapest_outgoing() {
        let mut builder = ModelBuilder::new(matrix());
        builder.forbid_transition(ci(0), ci(2)).with_ceiling(20);
        let model = builder.build();

        assert!(!model.is_transition_allowed(ci(0), ci(2)));
        assert!(model.is_transition_allowed(ci(2), ci(0)));
        assert_eq!(model.cheapest_outgoing(ci(0)), Some(4));
        assert_eq!(model.ceiling(), Some(20));
        assert_eq!(model.num_forbidden(), 1);
    }

    #[test]
    fn test_forbidden_from_mask() {
        let mut mask = ConnectionMask::new(3);
        mask.set_transition(ci(1), ci(0), false).unwrap();
        mask.set_transition(ci(1), ci(2), false).unwrap();

        let mut builder = ModelBuilder::new(matrix());
        builder.with_forbidden_from_mask(&mask);
        let model = builder.build();

        assert_eq!(model.cheapest_outgoing(ci(1)), None);
        assert_eq!(model.admissible_successors(ci(1)).count(), 0);
        assert_eq!(
            model.admissible_successors(ci(0)).collect::<Vec<_>>(),
            vec![ci(1), ci(2)]
        );
    }

    #[test]
    #[should_panic(expected = "called `ModelBuilder::new`")]
    fn test_single_city_panics() {
        let _ = ModelBuilder::new(Arc::new(DistanceMatrix::<i64>::from_rows(&[vec![0]])));
    }
}
