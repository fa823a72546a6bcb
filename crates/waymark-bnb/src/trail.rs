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
use waymark_model::index::CityIndex;

/// A single value removed from a successor domain.
///
/// Entries are stored in a linear log (`SearchTrail::entries`) and replayed
/// in reverse on backtrack, putting `value` back into the domain of `city`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TrailEntry {
    city: CityIndex,
    value: CityIndex,
}

impl TrailEntry {
    #[inline]
    pub fn new(city: CityIndex, value: CityIndex) -> Self {
        Self { city, value }
    }

    /// Returns the city whose domain lost a value.
    #[inline]
    pub fn city(&self) -> CityIndex {
        self.city
    }

    /// Returns the removed value.
    #[inline]
    pub fn value(&self) -> CityIndex {
        self.value
    }
}

impl std::fmt::Display for TrailEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TrailEntry(city: {}, removed: {})",
            self.city.get(),
            self.value.get()
        )
    }
}

/// A frame marker describing the boundaries of a decision level on the trail.
///
/// `FrameEntry` stores the objective and the path length before the level
/// was entered, plus the `entry_start_index` in the trail where it began.
/// All `TrailEntry`s added after `entry_start_index` belong to this frame.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameEntry<T> {
    previous_objective: T,
    previous_path_len: usize,
    entry_start_index: usize,
}

impl<T> FrameEntry<T>
where
    T: Copy,
{
    #[inline(always)]
    pub fn new(previous_objective: T, previous_path_len: usize, entry_start_index: usize) -> Self {
        Self {
            previous_objective,
            previous_path_len,
            entry_start_index,
        }
    }

    #[inline]
    pub fn previous_objective(&self) -> T {
        self.previous_objective
    }

    #[inline]
    pub fn previous_path_len(&self) -> usize {
        self.previous_path_len
    }

    #[inline]
    pub fn entry_start_index(&self) -> usize {
        self.entry_start_index
    }
}

impl<T> std::fmt::Display for FrameEntry<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FrameEntry(prev_objective: {}, prev_path_len: {}, entry_start_index: {})",
            self.previous_objective, self.previous_path_len, self.entry_start_index
        )
    }
}

/// A linear undo log with frame markers for efficient backtracking.
///
/// `SearchTrail` records every domain removal applied to `SearchState`
/// along with frame boundaries, enabling O(k) rollback of k removals.
/// Typical usage:
/// 1. Call `push_frame(state)` before entering a decision level,
/// 2. call `apply_transition(...)` for the chosen successor,
/// 3. on prune or completion, call `backtrack(state)` to restore the state
///    to the start of the frame.
#[derive(Debug, Clone)]
pub struct SearchTrail<T> {
    entries: Vec<TrailEntry>,
    frames: Vec<FrameEntry<T>>,
}

impl<T> Default for SearchTrail<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchTrail<T> {
    /// Creates a new, empty `SearchTrail`.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Creates a new `SearchTrail` preallocating space for `num_cities`.
    ///
    /// A full descent removes at most `num_cities` values per level, so
    /// `num_cities²` entries and `num_cities + 1` frames are reserved.
    #[inline]
    pub fn preallocated(num_cities: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_cities.saturating_mul(num_cities)),
            frames: Vec::with_capacity(num_cities.saturating_add(1)),
        }
    }

    /// Ensures the trail has capacity for the given problem size.
    pub fn ensure_capacity(&mut self, num_cities: usize) {
        let entry_capacity = num_cities.saturating_mul(num_cities);
        let frame_capacity = num_cities.saturating_add(1);
        if self.entries.capacity() < entry_capacity {
            self.entries
                .reserve(entry_capacity - self.entries.len());
        }
        if self.frames.capacity() < frame_capacity {
            self.frames.reserve(frame_capacity - self.frames.len());
        }
    }

    /// Returns the number of entries in the trail.
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Returns the current depth of the trail.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if there are no frames tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pushes a new frame, marking the start of a new decision level.
    #[inline]
    pub fn push_frame(&mut self, state: &SearchState<T>)
    where
        T: Copy,
    {
        self.frames.push(FrameEntry::new(
            state.current_objective(),
            state.path_len(),
            self.entries.len(),
        ));
    }

    /// Fixes the successor of the current tail to `to` and propagates:
    ///
    /// 1. the domain of the tail collapses to `{to}`,
    /// 2. `to` leaves every other domain,
    /// 3. city 0 leaves the domain of `to`, unless `to` completes the path,
    ///    in which case the domain of `to` collapses to `{0}`.
    ///
    /// Every removal is recorded so `backtrack` can undo it.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `to` is out of range or already on the path.
    pub fn apply_transition(&mut self, state: &mut SearchState<T>, to: CityIndex, new_objective: T)
    where
        T: PrimInt + Signed,
    {
        let num_cities = state.num_cities();
        debug_assert!(
            to.get() < num_cities,
            "called `SearchTrail::apply_transition` with city index out of bounds: the len is {} but the index is {}",
            num_cities,
            to.get()
        );
        debug_assert!(
            !state.is_visited(to),
            "called `SearchTrail::apply_transition` with city {} which is already on the path",
            to.get()
        );

        let tail = state.tail();
        for value in (0..num_cities).map(CityIndex::new) {
            if value != to {
                self.remove(state, tail, value);
            }
        }

        for city in (0..num_cities).map(CityIndex::new) {
            if city != tail {
                self.remove(state, city, to);
            }
        }

        state.extend_path(to);

        let origin = CityIndex::new(0);
        if state.path_len() < num_cities {
            self.remove(state, to, origin);
        } else {
            for value in (1..num_cities).map(CityIndex::new) {
                self.remove(state, to, value);
            }
        }

        state.set_current_objective(new_objective);
    }

    /// Undoes the most recent frame, restoring domains, path and objective.
    /// Returns `false` if there was no frame to undo.
    pub fn backtrack(&mut self, state: &mut SearchState<T>) -> bool
    where
        T: Copy,
    {
        let Some(frame) = self.frames.pop() else {
            return false;
        };

        while self.entries.len() > frame.entry_start_index() {
            if let Some(entry) = self.entries.pop() {
                state.restore_value(entry.city(), entry.value());
            }
        }

        state.truncate_path(frame.previous_path_len());
        state.set_current_objective(frame.previous_objective());
        true
    }

    /// Clears all entries and frames, keeping allocated capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }

    /// Returns the entries recorded in the current frame.
    #[inline]
    pub fn current_frame_entries(&self) -> &[TrailEntry] {
        match self.frames.last() {
            Some(frame) => &self.entries[frame.entry_start_index..],
            None => &[],
        }
    }

    #[inline]
    fn remove(&mut self, state: &mut SearchState<T>, city: CityIndex, value: CityIndex) {
        if state.remove_value(city, value) {
            self.entries.push(TrailEntry::new(city, value));
        }
    }
}

impl<T> std::fmt::Display for SearchTrail<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchTrail(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waymark_model::{matrix::DistanceMatrix, model::Model, model::ModelBuilder};

    fn c(i: usize) -> CityIndex {
        CityIndex::new(i)
    }

    fn model(n: usize) -> Model<i64> {
        let costs = (0..n * n)
            .map(|k| if k / n == k % n { 0 } else { 1 })
            .collect();
        ModelBuilder::new(Arc::new(DistanceMatrix::from_flat(n, costs))).build()
    }

    fn root(n: usize) -> (Model<i64>, SearchState<i64>) {
        let m = model(n);
        let mut s = SearchState::new(n);
        s.initialize(&m);
        (m, s)
    }

    #[test]
    fn test_apply_transition_propagates_all_different_and_circuit() {
        let (_m, mut s) = root(4);
        let mut trail = SearchTrail::new();

        trail.push_frame(&s);
        trail.apply_transition(&mut s, c(2), 1);

        // dom(0) collapsed to {2}
        assert_eq!(s.domain_size(c(0)), 1);
        assert!(s.domain_contains(c(0), c(2)));
        // 2 removed everywhere else
        assert!(!s.domain_contains(c(1), c(2)));
        assert!(!s.domain_contains(c(3), c(2)));
        // 2 may not close the circuit early
        assert!(!s.domain_contains(c(2), c(0)));
        assert_eq!(s.domain_size(c(2)), 2);
        assert_eq!(s.current_objective(), 1);
        assert_eq!(s.tail(), c(2));
    }

    #[test]
    fn test_last_city_collapses_to_origin() {
        let (_m, mut s) = root(3);
        let mut trail = SearchTrail::new();

        trail.push_frame(&s);
        trail.apply_transition(&mut s, c(1), 1);
        trail.push_frame(&s);
        trail.apply_transition(&mut s, c(2), 3);

        assert!(s.is_complete());
        assert_eq!(s.domain_size(c(2)), 1);
        assert!(s.domain_contains(c(2), c(0)));
    }

    #[test]
    fn test_backtrack_restores_exact_state() {
        let (_m, mut s) = root(5);
        let before: Vec<_> = (0..5).map(|i| s.domain(c(i)).clone()).collect();
        let mut trail = SearchTrail::new();

        trail.push_frame(&s);
        trail.apply_transition(&mut s, c(3), 1);
        let mid: Vec<_> = (0..5).map(|i| s.domain(c(i)).clone()).collect();
        trail.push_frame(&s);
        trail.apply_transition(&mut s, c(1), 2);
        assert!(!trail.current_frame_entries().is_empty());

        assert!(trail.backtrack(&mut s));
        let after_one: Vec<_> = (0..5).map(|i| s.domain(c(i)).clone()).collect();
        assert_eq!(after_one, mid);
        assert_eq!(s.path(), &[c(0), c(3)]);
        assert_eq!(s.current_objective(), 1);

        assert!(trail.backtrack(&mut s));
        let after_two: Vec<_> = (0..5).map(|i| s.domain(c(i)).clone()).collect();
        assert_eq!(after_two, before);
        assert_eq!(s.path(), &[c(0)]);
        assert_eq!(s.current_objective(), 0);
        assert_eq!(trail.num_entries(), 0);

        assert!(!trail.backtrack(&mut s));
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut trail = SearchTrail::<i64>::preallocated(6);
        let cap = trail.entries.capacity();
        let (_m, mut s) = root(6);
        trail.push_frame(&s);
        trail.apply_transition(&mut s, c(4), 1);
        trail.reset();
        assert!(trail.is_empty());
        assert_eq!(trail.num_entries(), 0);
        assert!(trail.entries.capacity() >= cap);
        assert_eq!(format!("{}", trail), "SearchTrail(entries: 0, frames: 0)");
    }
}
