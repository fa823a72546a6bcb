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

//! # Shared Incumbent
//!
//! The best exact tour found by any portfolio worker. A lock-free `AtomicI64`
//! upper bound short-circuits obviously worse candidates; the `Tour` itself
//! lives behind a `Mutex` and is the source of truth. The bound starts at
//! `i64::MAX`, meaning "no incumbent yet".
//!
//! This is portfolio-internal: workers tighten their pruning bound through it.
//! The cross-strategy best distance lives in `SharedCoordinationState`.

use num_traits::{PrimInt, Signed};
use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicI64, Ordering},
};
use waymark_model::tour::Tour;

/// A concurrent holder for the best tour found during exact search.
#[derive(Debug)]
pub struct SharedIncumbent<T> {
    /// Objective of the incumbent stored as `i64` for atomic access.
    upper_bound: AtomicI64,

    /// The incumbent tour.
    tour: Mutex<Option<Tour<T>>>,
}

impl<T> Default for SharedIncumbent<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Display for SharedIncumbent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Incumbent(upper_bound: {})", self.upper_bound())
    }
}

impl<T> SharedIncumbent<T> {
    /// Creates a new shared incumbent with no tour installed.
    #[inline]
    pub fn new() -> Self {
        SharedIncumbent {
            upper_bound: AtomicI64::new(i64::MAX),
            tour: Mutex::new(None),
        }
    }

    /// Returns the current upper bound.
    #[inline]
    pub fn upper_bound(&self) -> i64 {
        self.upper_bound.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of the current incumbent, if any.
    #[inline]
    pub fn snapshot(&self) -> Option<Tour<T>>
    where
        T: Clone,
    {
        self.lock().clone()
    }

    /// Attempts to install `candidate`. Returns `true` if it was strictly
    /// better than the current incumbent.
    pub fn try_install(&self, candidate: &Tour<T>) -> bool
    where
        T: PrimInt + Signed + Into<i64>,
    {
        let candidate_objective: i64 = candidate.objective_value().into();
        if candidate_objective >= self.upper_bound() {
            return false;
        }

        let mut guard = self.lock();
        // The atomic is only a hint; compare against the tour under the lock.
        if let Some(current) = guard.as_ref() {
            let current_objective: i64 = current.objective_value().into();
            if candidate_objective >= current_objective {
                return false;
            }
        }

        *guard = Some(candidate.clone());
        self.upper_bound
            .store(candidate_objective, Ordering::Relaxed);
        true
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, Option<Tour<T>>> {
        self.tour.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::SharedIncumbent;
    use std::sync::Arc;
    use std::thread;
    use waymark_model::{index::CityIndex, tour::Tour};

    fn make_tour(objective: i64, n: usize) -> Tour<i64> {
        Tour::new(objective, (0..n).map(CityIndex::new).collect())
    }

    #[test]
    fn test_initial_state() {
        let inc: SharedIncumbent<i64> = SharedIncumbent::new();
        assert_eq!(inc.upper_bound(), i64::MAX);
        assert!(inc.snapshot().is_none());
    }

    #[test]
    fn test_reject_worse_or_equal_candidates() {
        let inc: SharedIncumbent<i64> = SharedIncumbent::new();
        assert!(inc.try_install(&make_tour(100, 3)));
        assert!(!inc.try_install(&make_tour(150, 3)));
        assert!(!inc.try_install(&make_tour(100, 3)));
        assert_eq!(inc.upper_bound(), 100);
        assert_eq!(inc.snapshot().unwrap().objective_value(), 100);
    }

    #[test]
    fn test_concurrent_installs_minimum_wins() {
        let inc = Arc::new(SharedIncumbent::<i64>::new());
        let objectives = vec![300, 200, 400, 50, 120, 75, 500, 60, 90];

        let handles: Vec<_> = objectives
            .iter()
            .copied()
            .map(|obj| {
                let inc = Arc::clone(&inc);
                thread::spawn(move || inc.try_install(&make_tour(obj, 4)))
            })
            .collect();
        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().any(|&r| r));

        let snap = inc.snapshot().expect("snapshot after installs");
        assert_eq!(snap.objective_value(), 50);
        assert_eq!(inc.upper_bound(), 50);
        assert_eq!(snap.num_cities(), 4);
    }

    #[test]
    fn test_incumbent_with_i32() {
        let inc: SharedIncumbent<i32> = SharedIncumbent::new();
        let tour = Tour::new(42i32, vec![CityIndex::new(1), CityIndex::new(0)]);
        assert!(inc.try_install(&tour));
        assert_eq!(inc.upper_bound(), 42);
        assert_eq!(inc.snapshot().unwrap(), tour);
    }
}
