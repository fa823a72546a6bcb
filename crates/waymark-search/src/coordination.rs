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

//! # Shared Coordination State
//!
//! The single rendezvous point between the exact search portfolio, the
//! evolutionary refiner and the orchestrator. It holds three pieces of state:
//!
//! - `best_distance`: the best tour length reported by either side. Starts at
//!   `UNBOUNDED_DISTANCE` and only ever decreases.
//! - `latest_mask`: the most recently published `ConnectionMask`, absent until
//!   the first publish.
//! - `stop_requested`: a one-way flag, never reset.
//!
//! ## Concurrency
//!
//! - The distance is an `f64` stored as raw bits in an `AtomicU64` and updated
//!   with a compare-and-swap loop, so reports are totally ordered and never
//!   block. A successful report also raises an "improved" flag that pollers
//!   consume with `take_improvement`.
//! - The mask slot is a `Mutex<Option<Arc<ConnectionMask>>>` paired with a
//!   `Condvar`. Publishing swaps in a fresh `Arc` and wakes every waiter;
//!   waiters always observe the newest mask and may skip intermediate ones.
//! - `await_mask` re-enters the wait on spurious wake-ups and returns `None`
//!   only when a stop was requested before any mask was published, so a
//!   refiner whose publisher never arrives can still shut down.
//! - Poisoned locks are recovered; the protected data is a plain slot that
//!   cannot be left half-written.
//!
//! Masks are moved into `publish_mask` by value and shared immutably from
//! then on, so a publisher can never mutate a snapshot another thread reads.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use waymark_model::mask::ConnectionMask;
//! use waymark_search::coordination::SharedCoordinationState;
//!
//! let state = Arc::new(SharedCoordinationState::new());
//! assert!(state.report_distance(120.0));
//! assert!(!state.report_distance(130.0));
//! assert_eq!(state.current_best_distance(), 120.0);
//!
//! state.publish_mask(ConnectionMask::new(4));
//! let mask = state.await_mask().expect("a mask was published");
//! assert_eq!(mask.num_cities(), 4);
//! ```

use num_traits::{NumCast, PrimInt};
use std::sync::{
    Arc, Condvar, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use waymark_model::mask::ConnectionMask;

/// The best distance before anything was reported.
pub const UNBOUNDED_DISTANCE: f64 = f64::MAX;

/// Synchronized state shared by the exact search, the refiner and the orchestrator.
pub struct SharedCoordinationState {
    best_distance: AtomicU64,
    improved: AtomicBool,
    stop_requested: AtomicBool,
    latest_mask: Mutex<Option<Arc<ConnectionMask>>>,
    mask_available: Condvar,
    masks_published: AtomicU64,
}

impl Default for SharedCoordinationState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedCoordinationState {
    /// Creates a new state with an unbounded distance, no mask and no stop request.
    pub fn new() -> Self {
        Self {
            best_distance: AtomicU64::new(UNBOUNDED_DISTANCE.to_bits()),
            improved: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            latest_mask: Mutex::new(None),
            mask_available: Condvar::new(),
            masks_published: AtomicU64::new(0),
        }
    }

    /// Replaces the latest mask and wakes every thread blocked in `await_mask`.
    pub fn publish_mask(&self, mask: ConnectionMask) {
        let mask = Arc::new(mask);
        {
            let mut slot = self.lock_mask();
            *slot = Some(mask);
            self.masks_published.fetch_add(1, Ordering::Relaxed);
        }
        self.mask_available.notify_all();
        tracing::trace!("published connection mask");
    }

    /// Blocks until a mask is available and returns the most recent one.
    ///
    /// Returns `None` only if a stop is requested while no mask has been
    /// published yet. Once any mask exists this never blocks.
    pub fn await_mask(&self) -> Option<Arc<ConnectionMask>> {
        let mut slot = self.lock_mask();
        loop {
            if let Some(mask) = slot.as_ref() {
                return Some(Arc::clone(mask));
            }
            if self.stop_requested() {
                return None;
            }
            slot = self
                .mask_available
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Returns the most recent mask without blocking.
    pub fn latest_mask(&self) -> Option<Arc<ConnectionMask>> {
        self.lock_mask().as_ref().map(Arc::clone)
    }

    /// Returns how many masks have been published so far.
    #[inline]
    pub fn masks_published(&self) -> u64 {
        self.masks_published.load(Ordering::Relaxed)
    }

    /// Offers a candidate distance.
    ///
    /// The candidate is accepted only if it is strictly smaller than the
    /// current best. Returns `true` if it was accepted. `NaN` is never accepted.
    pub fn report_distance(&self, candidate: f64) -> bool {
        let accepted = self
            .best_distance
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                (candidate < f64::from_bits(bits)).then_some(candidate.to_bits())
            })
            .is_ok();

        if accepted {
            self.improved.store(true, Ordering::Release);
            tracing::trace!(distance = candidate, "accepted improved distance");
        }
        accepted
    }

    /// Returns the best distance accepted so far. Never blocks.
    #[inline]
    pub fn current_best_distance(&self) -> f64 {
        f64::from_bits(self.best_distance.load(Ordering::Acquire))
    }

    /// Returns `true` if any distance has been accepted.
    #[inline]
    pub fn has_distance(&self) -> bool {
        self.current_best_distance() < UNBOUNDED_DISTANCE
    }

    /// Consumes the "improved" flag, returning whether an improvement was
    /// accepted since the last call.
    #[inline]
    pub fn take_improvement(&self) -> bool {
        self.improved.swap(false, Ordering::AcqRel)
    }

    /// Converts the current best distance into an integer ceiling.
    ///
    /// The distance is rounded up. Returns `None` while no distance has been
    /// accepted or if the value does not fit into `T`.
    pub fn ceiling<T>(&self) -> Option<T>
    where
        T: PrimInt,
    {
        let best = self.current_best_distance();
        if best >= UNBOUNDED_DISTANCE {
            return None;
        }
        <T as NumCast>::from(best.ceil())
    }

    /// Requests every cooperating worker to stop. Idempotent.
    pub fn request_stop(&self) {
        if self.stop_requested.swap(true, Ordering::AcqRel) {
            return;
        }
        // Taking the lock orders the flag store before any waiter re-checks it.
        drop(self.lock_mask());
        self.mask_available.notify_all();
        tracing::debug!("stop requested");
    }

    /// Returns `true` once a stop has been requested.
    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    #[inline]
    fn lock_mask(&self) -> MutexGuard<'_, Option<Arc<ConnectionMask>>> {
        self.latest_mask
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SharedCoordinationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCoordinationState")
            .field("best_distance", &self.current_best_distance())
            .field("masks_published", &self.masks_published())
            .field("stop_requested", &self.stop_requested())
            .finish()
    }
}

impl std::fmt::Display for SharedCoordinationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SharedCoordinationState(best_distance: {}, masks_published: {})",
            self.current_best_distance(),
            self.masks_published()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::{thread, time::Duration};
    use waymark_model::index::CityIndex;

    #[test]
    fn test_initial_state() {
        let state = SharedCoordinationState::new();
        assert_eq!(state.current_best_distance(), UNBOUNDED_DISTANCE);
        assert!(!state.has_distance());
        assert!(state.latest_mask().is_none());
        assert!(!state.stop_requested());
        assert!(!state.take_improvement());
        assert_eq!(state.ceiling::<i64>(), None);
        assert_eq!(state.masks_published(), 0);
    }

    #[test]
    fn test_report_distance_is_strict() {
        let state = SharedCoordinationState::new();
        assert!(state.report_distance(100.0));
        assert!(state.take_improvement());
        assert!(!state.take_improvement());

        assert!(!state.report_distance(100.0));
        assert!(!state.report_distance(150.0));
        assert!(!state.report_distance(f64::NAN));
        assert!(!state.report_distance(f64::MAX));
        assert!(!state.take_improvement());

        assert!(state.report_distance(99.5));
        assert_eq!(state.current_best_distance(), 99.5);
        assert_eq!(state.ceiling::<i64>(), Some(100));
    }

    #[test]
    fn test_infeasible_report_on_fresh_state_is_discarded() {
        let state = SharedCoordinationState::new();
        assert!(!state.report_distance(UNBOUNDED_DISTANCE));
        assert!(!state.has_distance());
    }

    #[test]
    fn test_ceiling_out_of_range() {
        let state = SharedCoordinationState::new();
        assert!(state.report_distance(1e12));
        assert_eq!(state.ceiling::<i32>(), None);
        assert_eq!(state.ceiling::<i64>(), Some(1_000_000_000_000));
    }

    #[test]
    fn test_await_mask_blocks_until_publish() {
        let state = Arc::new(SharedCoordinationState::new());
        let returned = Arc::new(AtomicBool::new(false));

        let waiter = {
            let state = Arc::clone(&state);
            let returned = Arc::clone(&returned);
            thread::spawn(move || {
                let mask = state.await_mask();
                returned.store(true, Ordering::SeqCst);
                mask
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!returned.load(Ordering::SeqCst), "waiter returned before publish");

        let mut mask = ConnectionMask::new(5);
        mask.set_transition(CityIndex::new(0), CityIndex::new(3), false)
            .unwrap();
        let expected = mask.clone();
        state.publish_mask(mask);

        let received = waiter.join().unwrap().expect("mask after publish");
        assert_eq!(*received, expected);
        assert_eq!(state.masks_published(), 1);
    }

    #[test]
    fn test_await_mask_sees_latest_only() {
        let state = SharedCoordinationState::new();
        state.publish_mask(ConnectionMask::new(3));
        state.publish_mask(ConnectionMask::new(4));

        assert_eq!(state.await_mask().unwrap().num_cities(), 4);
        assert_eq!(state.latest_mask().unwrap().num_cities(), 4);
        assert_eq!(state.masks_published(), 2);
    }

    #[test]
    fn test_stop_releases_waiter_without_mask() {
        let state = Arc::new(SharedCoordinationState::new());
        let waiter = {
            let state = Arc::clone(&state);
            thread::spawn(move || state.await_mask())
        };

        thread::sleep(Duration::from_millis(20));
        state.request_stop();
        state.request_stop();

        assert!(waiter.join().unwrap().is_none());
        assert!(state.stop_requested());
    }

    #[test]
    fn test_mask_wins_over_stop_once_published() {
        let state = SharedCoordinationState::new();
        state.publish_mask(ConnectionMask::new(2));
        state.request_stop();
        assert!(state.await_mask().is_some());
    }

    #[test]
    fn test_concurrent_reports_keep_minimum() {
        let state = Arc::new(SharedCoordinationState::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    for k in 0..500 {
                        state.report_distance(((k * 7 + t * 13) % 1000) as f64 + 10.0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(state.current_best_distance(), 10.0);
    }

    proptest! {
        #[test]
        fn prop_best_distance_is_running_minimum(values in proptest::collection::vec(0.0f64..1e9, 0..64)) {
            let state = SharedCoordinationState::new();
            let mut expected = UNBOUNDED_DISTANCE;
            for v in values {
                let accepted = state.report_distance(v);
                prop_assert_eq!(accepted, v < expected);
                expected = expected.min(v);
                prop_assert_eq!(state.current_best_distance(), expected);
            }
        }
    }
}
