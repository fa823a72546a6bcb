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

//! Dense base distance matrix.
//!
//! `DistanceMatrix<T>` stores the immutable `C × C` cost table in a single
//! row-major vector. Entry `(i, j)` is the cost of travelling from city `i`
//! to city `j`. The diagonal is stored but never read by any solver: self
//! transitions are excluded by construction everywhere.
//!
//! The matrix is shared between the exact search workers and the evolutionary
//! refiner behind an `Arc`, so it is never mutated after construction.
//! Restricted views are derived separately (see `costs::EdgeCostModel`).

use crate::index::CityIndex;
use num_traits::{PrimInt, Signed};

/// An immutable, row-major `C × C` cost table.
#[derive(Clone, PartialEq, Eq)]
pub struct DistanceMatrix<T> {
    num_cities: usize,
    costs: Vec<T>,
}

impl<T> DistanceMatrix<T>
where
    T: PrimInt + Signed,
{
    /// Creates a matrix from a flat, row-major vector.
    ///
    /// # Panics
    ///
    /// Panics if `costs.len() != num_cities * num_cities`.
    pub fn from_flat(num_cities: usize, costs: Vec<T>) -> Self {
        assert_eq!(
            costs.len(),
            num_cities * num_cities,
            "called `DistanceMatrix::from_flat` with {} entries for {} cities",
            costs.len(),
            num_cities
        );

        Self { num_cities, costs }
    }

    /// Creates a matrix from nested rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not form a square matrix.
    pub fn from_rows(rows: &[Vec<T>]) -> Self {
        let num_cities = rows.len();
        let mut costs = Vec::with_capacity(num_cities * num_cities);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(
                row.len(),
                num_cities,
                "called `DistanceMatrix::from_rows` with ragged row {}: expected {} entries, got {}",
                i,
                num_cities,
                row.len()
            );
            costs.extend_from_slice(row);
        }

        Self { num_cities, costs }
    }

    /// Returns the number of cities.
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.num_cities
    }

    /// Returns the cost of the transition `from -> to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn cost(&self, from: CityIndex, to: CityIndex) -> T {
        assert!(
            from.get() < self.num_cities && to.get() < self.num_cities,
            "called `DistanceMatrix::cost` with ({}, {}) but the matrix has {} cities",
            from.get(),
            to.get(),
            self.num_cities
        );

        self.costs[self.flat_index(from, to)]
    }

    /// Returns the cost of the transition `from -> to` without bounds checks.
    ///
    /// # Safety
    ///
    /// Both indices must be smaller than `num_cities()`.
    #[inline(always)]
    pub unsafe fn cost_unchecked(&self, from: CityIndex, to: CityIndex) -> T {
        debug_assert!(
            from.get() < self.num_cities && to.get() < self.num_cities,
            "called `DistanceMatrix::cost_unchecked` with ({}, {}) but the matrix has {} cities",
            from.get(),
            to.get(),
            self.num_cities
        );

        unsafe { *self.costs.get_unchecked(self.flat_index(from, to)) }
    }

    /// Returns the outgoing costs of `from` as a slice indexed by destination.
    #[inline]
    pub fn row(&self, from: CityIndex) -> &[T] {
        let start = from.get() * self.num_cities;
        &self.costs[start..start + self.num_cities]
    }

    /// Returns the flat, row-major cost vector.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.costs
    }

    /// Returns the largest off-diagonal cost, or `None` for fewer than two cities.
    pub fn max_cost(&self) -> Option<T> {
        (0..self.num_cities)
            .flat_map(|i| (0..self.num_cities).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| self.costs[i * self.num_cities + j])
            .max()
    }

    #[inline(always)]
    fn flat_index(&self, from: CityIndex, to: CityIndex) -> usize {
        from.get() * self.num_cities + to.get()
    }
}

impl<T> std::fmt::Debug for DistanceMatrix<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceMatrix")
            .field("num_cities", &self.num_cities)
            .finish()
    }
}

impl<T> std::fmt::Display for DistanceMatrix<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.costs.chunks(self.num_cities.max(1)) {
            let line = row
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{{{}}}", line)?;
        }
        Ok(())
    }
}
