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

use crate::index::CityIndex;
use num_traits::{PrimInt, Signed};

/// A closed tour through every city together with its length.
///
/// `order[k]` is the `k`-th city visited; the tour returns from the last
/// city to the first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tour<T> {
    /// The total length of the closed tour.
    objective_value: T,

    /// The visiting order.
    order: Vec<CityIndex>,
}

impl<T> Tour<T>
where
    T: PrimInt + Signed + Copy,
{
    /// Constructs a new `Tour`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `order` is not a permutation of `0..order.len()`.
    pub fn new(objective_value: T, order: Vec<CityIndex>) -> Self {
        debug_assert!(
            is_permutation(&order),
            "called `Tour::new` with an order that is not a permutation: {:?}",
            order
        );

        Self {
            objective_value,
            order,
        }
    }

    /// Returns the total length of the tour.
    #[inline]
    pub fn objective_value(&self) -> T {
        self.objective_value
    }

    /// Returns the visiting order.
    #[inline]
    pub fn order(&self) -> &[CityIndex] {
        &self.order
    }

    /// Returns the number of cities in the tour.
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.order.len()
    }

    /// Returns the city visited right after `city`, wrapping at the end.
    ///
    /// Returns `None` if `city` does not occur in the tour.
    pub fn successor_of(&self, city: CityIndex) -> Option<CityIndex> {
        let position = self.order.iter().position(|&c| c == city)?;
        Some(self.order[(position + 1) % self.order.len()])
    }

    /// Returns the successor array: `successors()[i]` is the city after `i`.
    pub fn successors(&self) -> Vec<CityIndex> {
        let n = self.order.len();
        let mut successors = vec![CityIndex::new(0); n];
        for (k, &city) in self.order.iter().enumerate() {
            successors[city.get()] = self.order[(k + 1) % n];
        }
        successors
    }
}

/// Returns `true` if `order` visits every city of `0..order.len()` exactly once.
pub fn is_permutation(order: &[CityIndex]) -> bool {
    let mut seen = vec![false; order.len()];
    for city in order {
        match seen.get_mut(city.get()) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

impl<T> std::fmt::Display for Tour<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tour(objective: {}, order: [", self.objective_value)?;
        for (k, city) in self.order.iter().enumerate() {
            if k > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", city.get())?;
        }
        write!(f, "])")
    }
}
