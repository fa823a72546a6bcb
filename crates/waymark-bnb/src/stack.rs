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

use crate::branching::decision::Decision;

/// A frame-structured LIFO stack of pending decisions.
///
/// `SearchStack` stores all enqueued `Decision`s linearly and uses a
/// `frames` index stack to mark decision-level boundaries. Popping a frame
/// truncates `entries` back to the recorded start index.
#[derive(Clone, Debug)]
pub struct SearchStack<T> {
    entries: Vec<Decision<T>>,
    /// `frames[i]` stores the index in `entries` where depth `i` began.
    frames: Vec<usize>,
}

impl<T> Default for SearchStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchStack<T> {
    /// Creates a new, empty `SearchStack`.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Creates a preallocated `SearchStack` for `num_cities`.
    #[inline]
    pub fn preallocated(num_cities: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_cities.saturating_mul(num_cities)),
            frames: Vec::with_capacity(num_cities.saturating_add(1)),
        }
    }

    /// Ensures the stack has capacity for the given problem size.
    #[inline]
    pub fn ensure_capacity(&mut self, num_cities: usize) {
        let entry_capacity = num_cities.saturating_mul(num_cities);
        let frame_capacity = num_cities.saturating_add(1);

        if self.entries.capacity() < entry_capacity {
            self.entries.reserve(entry_capacity - self.entries.len());
        }
        if self.frames.capacity() < frame_capacity {
            self.frames.reserve(frame_capacity - self.frames.len());
        }
    }

    /// Returns the number of pending decisions.
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Returns the current search depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if there are no frames tracked (search exhausted).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pushes a new frame onto the stack.
    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    /// Pops the current frame, dropping its remaining decisions.
    #[inline]
    pub fn pop_frame(&mut self) -> Option<()> {
        let start = self.frames.pop()?;
        self.entries.truncate(start);
        Some(())
    }

    #[inline]
    pub fn push(&mut self, decision: Decision<T>) {
        self.entries.push(decision);
    }

    #[inline]
    pub fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = Decision<T>>,
    {
        self.entries.extend(iter);
    }

    /// Pops the next decision (LIFO).
    #[inline]
    pub fn pop(&mut self) -> Option<Decision<T>> {
        self.entries.pop()
    }

    /// Clears all entries and frames, keeping allocated capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.entries.clear();
        self.frames.clear();
    }

    /// Returns `true` if the current level has no remaining decisions.
    #[inline]
    pub fn is_current_level_empty(&self) -> bool {
        match self.frames.last() {
            Some(&start) => self.entries.len() == start,
            None => true,
        }
    }

    /// Returns the decisions still pending in the current frame.
    #[inline]
    pub fn current_frame_entries(&self) -> &[Decision<T>] {
        match self.frames.last() {
            Some(&start) => &self.entries[start..],
            None => &[],
        }
    }
}

impl<T> std::fmt::Display for SearchStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchStack(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_model::index::CityIndex;

    fn d(from: usize, to: usize) -> Decision<i64> {
        Decision::new(CityIndex::new(from), CityIndex::new(to), (from + to) as i64)
    }

    #[test]
    fn test_new_stack_is_exhausted() {
        let s = SearchStack::<i64>::new();
        assert!(s.is_empty());
        assert!(s.is_current_level_empty());
        assert_eq!(s.current_frame_entries(), &[]);
        assert_eq!(format!("{}", s), "SearchStack(entries: 0, frames: 0)");
    }

    #[test]
    fn test_frames_isolate_levels() {
        let mut s = SearchStack::preallocated(4);
        s.push_frame();
        s.extend([d(0, 1), d(0, 2)]);
        s.push_frame();
        assert!(s.is_current_level_empty());
        s.push(d(2, 3));
        assert_eq!(s.current_frame_entries(), &[d(2, 3)]);

        assert_eq!(s.pop_frame(), Some(()));
        assert_eq!(s.current_frame_entries(), &[d(0, 1), d(0, 2)]);
        assert_eq!(s.pop(), Some(d(0, 2)));
        assert_eq!(s.num_entries(), 1);
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn test_pop_frame_drops_pending_decisions() {
        let mut s = SearchStack::new();
        s.push_frame();
        s.push(d(0, 1));
        s.push_frame();
        s.extend([d(1, 2), d(1, 3)]);
        s.pop_frame();
        assert_eq!(s.num_entries(), 1);
        s.pop_frame();
        assert!(s.is_empty());
        assert_eq!(s.pop_frame(), None);
    }

    #[test]
    fn test_reset_and_ensure_capacity() {
        let mut s = SearchStack::<i64>::new();
        s.ensure_capacity(5);
        assert!(s.entries.capacity() >= 25);
        assert!(s.frames.capacity() >= 6);
        s.push_frame();
        s.push(d(0, 4));
        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.num_entries(), 0);
    }
}
