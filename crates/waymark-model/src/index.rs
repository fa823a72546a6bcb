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

//! Strongly typed city index.
//!
//! `CityIndex` is a transparent wrapper around `usize` so that city positions
//! cannot be confused with generation counters, block indices or other raw
//! integers floating around the solver.

/// The index of a city in a distance matrix.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CityIndex(usize);

impl CityIndex {
    /// Creates a new `CityIndex`.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying `usize` index.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Returns `true` if this is the first city.
    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Debug for CityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CityIndex({})", self.0)
    }
}

impl std::fmt::Display for CityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CityIndex({})", self.0)
    }
}

impl From<usize> for CityIndex {
    #[inline(always)]
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<CityIndex> for usize {
    #[inline(always)]
    fn from(index: CityIndex) -> Self {
        index.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_display() {
        let c = CityIndex::new(7);
        assert_eq!(c.get(), 7);
        assert_eq!(usize::from(c), 7);
        assert_eq!(CityIndex::from(7usize), c);
        assert_eq!(format!("{}", c), "CityIndex(7)");
        assert_eq!(format!("{:?}", c), "CityIndex(7)");
    }

    #[test]
    fn test_is_zero_and_ordering() {
        assert!(CityIndex::new(0).is_zero());
        assert!(!CityIndex::new(3).is_zero());
        assert!(CityIndex::new(1) < CityIndex::new(2));
    }
}
