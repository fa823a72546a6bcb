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

//! Incumbent management for branch and bound
//!
//! `IncumbentStore<T>` reads and updates the best known objective (upper
//! bound) and publishes new tours during search. It abstracts over local
//! (single-threaded) and shared (portfolio) use.
//!
//! Implementations
//! - `NoSharedIncumbent<T>`: local only. `initial_upper_bound = T::MAX`,
//!   `tighten(x) = x`, and `on_solution_found` is a no-op.
//! - `SharedIncumbentAdapter<'a, T>`: wraps `waymark_search::incumbent::SharedIncumbent<T>`;
//!   `tighten(x)` returns `min(shared, x)` and `on_solution_found` attempts
//!   installation.

use std::marker::PhantomData;
use waymark_model::tour::Tour;
use waymark_search::{
    incumbent::SharedIncumbent,
    num::{SolverNumeric, saturating_from_i64},
};

/// Access to the best known tour objective during a run.
pub trait IncumbentStore<T>
where
    T: SolverNumeric,
{
    /// Returns the initial upper bound.
    fn initial_upper_bound(&self) -> T;
    /// Combines the local best with whatever the store knows.
    fn tighten(&self, current_local_best: T) -> T;
    /// Notifies the store that a new tour has been found.
    fn on_solution_found(&self, tour: &Tour<T>);
    /// Returns the best tour the store knows about.
    fn snapshot(&self) -> Option<Tour<T>>;
}

/// A store that shares nothing. Use for isolated runs.
#[repr(transparent)]
#[derive(Debug)]
pub struct NoSharedIncumbent<T>(PhantomData<T>);

impl<T> Default for NoSharedIncumbent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NoSharedIncumbent<T> {
    #[inline(always)]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> IncumbentStore<T> for NoSharedIncumbent<T>
where
    T: SolverNumeric,
{
    #[inline(always)]
    fn initial_upper_bound(&self) -> T {
        T::max_value()
    }

    #[inline(always)]
    fn tighten(&self, current_local_best: T) -> T {
        current_local_best
    }

    #[inline(always)]
    fn on_solution_found(&self, _: &Tour<T>) {}

    #[inline(always)]
    fn snapshot(&self) -> Option<Tour<T>> {
        None
    }
}

/// A store backed by a `SharedIncumbent` shared across portfolio workers.
#[repr(transparent)]
#[derive(Debug, Clone)]
pub struct SharedIncumbentAdapter<'a, T> {
    inner: &'a SharedIncumbent<T>,
}

impl<'a, T> SharedIncumbentAdapter<'a, T> {
    #[inline(always)]
    pub fn new(inner: &'a SharedIncumbent<T>) -> Self {
        Self { inner }
    }
}

impl<'a, T> IncumbentStore<T> for SharedIncumbentAdapter<'a, T>
where
    T: SolverNumeric,
{
    #[inline(always)]
    fn initial_upper_bound(&self) -> T {
        saturating_from_i64(self.inner.upper_bound())
    }

    #[inline(always)]
    fn tighten(&self, current_local_best: T) -> T {
        let shared: T = saturating_from_i64(self.inner.upper_bound());
        shared.min(current_local_best)
    }

    #[inline(always)]
    fn on_solution_found(&self, tour: &Tour<T>) {
        self.inner.try_install(tour);
    }

    #[inline]
    fn snapshot(&self) -> Option<Tour<T>> {
        self.inner.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_model::index::CityIndex;

    fn tour(objective: i32) -> Tour<i32> {
        Tour::new(objective, (0..4).map(CityIndex::new).collect())
    }

    #[test]
    fn test_no_shared_incumbent_is_transparent() {
        let store = NoSharedIncumbent::<i32>::new();
        assert_eq!(store.initial_upper_bound(), i32::MAX);
        assert_eq!(store.tighten(17), 17);
        store.on_solution_found(&tour(3));
        assert_eq!(store.tighten(17), 17);
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_shared_adapter_saturates_empty_bound() {
        let shared = SharedIncumbent::<i32>::new();
        let store = SharedIncumbentAdapter::new(&shared);
        // i64::MAX does not fit i32.
        assert_eq!(store.initial_upper_bound(), i32::MAX);
        assert_eq!(store.tighten(100), 100);
    }

    #[test]
    fn test_shared_adapter_installs_and_tightens() {
        let shared = SharedIncumbent::<i32>::new();
        let store = SharedIncumbentAdapter::new(&shared);
        store.on_solution_found(&tour(40));
        assert_eq!(store.tighten(100), 40);
        assert_eq!(store.tighten(10), 10);

        // A worse tour never loosens the bound.
        store.on_solution_found(&tour(90));
        assert_eq!(shared.upper_bound(), 40);
        assert_eq!(shared.snapshot().map(|t| t.objective_value()), Some(40));
    }
}
