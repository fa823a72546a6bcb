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

//! # Connection Mask
//!
//! A packed bitset over the directed `C × C` transition relation. Bit `(i, j)`
//! says whether the transition `i -> j` is still consistent with the search
//! frontier the mask was sampled from.
//!
//! ## Layout
//!
//! The relation is flattened row-major, `idx = i * C + j`, and packed into
//! 64-bit blocks: `block = idx / 64`. Within a block bits are stored
//! most-significant-bit first, i.e. `idx` lives at bit position
//! `63 - (idx % 64)`. The block count is `ceil(C * C / 64)`; padding bits in
//! the last block are kept set and never read.
//!
//! ## Semantics
//!
//! - A fresh mask is default-open: every transition is allowed.
//! - `snapshot_from_domains` is a full overwrite of the `C × C` range from a
//!   `SuccessorDomains` provider, never a merge with the previous content.
//! - Self transitions `(i, i)` carry no meaning; consumers skip them.
//!
//! Once handed to the coordination state a mask is shared immutably behind an
//! `Arc`; publishers build a fresh mask for every snapshot.

use crate::index::CityIndex;

/// Number of transition bits stored per block.
pub const BLOCK_BITS: usize = 64;

/// Read access to the admissible successor values of every city.
///
/// This is the contract between a search engine and `ConnectionMask`:
/// the engine reports, for each city, which successors are still in its
/// domain at the instant of the call.
pub trait SuccessorDomains {
    /// Returns the number of cities (decision variables).
    fn num_cities(&self) -> usize;

    /// Returns `true` if `to` is still an admissible successor of `from`.
    fn contains(&self, from: CityIndex, to: CityIndex) -> bool;
}

/// Errors raised by mask mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    /// A transition outside of the `C × C` range was addressed.
    #[error("transition ({from}, {to}) is out of range for a mask over {num_cities} cities")]
    IndexOutOfRange {
        from: usize,
        to: usize,
        num_cities: usize,
    },
}

/// A packed, MSB-first bitset over directed city transitions.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectionMask {
    num_cities: usize,
    blocks: Vec<u64>,
}

impl ConnectionMask {
    /// Creates a mask over `num_cities` cities with every transition allowed.
    pub fn new(num_cities: usize) -> Self {
        Self {
            num_cities,
            blocks: vec![u64::MAX; Self::blocks_for(num_cities)],
        }
    }

    /// Creates a mask reflecting the current domains of `domains`.
    pub fn from_domains<D>(domains: &D) -> Self
    where
        D: SuccessorDomains + ?Sized,
    {
        let mut mask = Self::new(domains.num_cities());
        mask.snapshot_from_domains(domains);
        mask
    }

    /// Returns the number of 64-bit blocks needed for `num_cities` cities.
    #[inline]
    pub const fn blocks_for(num_cities: usize) -> usize {
        (num_cities * num_cities).div_ceil(BLOCK_BITS)
    }

    /// Returns the number of cities this mask covers.
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.num_cities
    }

    /// Returns the packed blocks.
    #[inline]
    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    /// Allows or forbids the transition `from -> to`.
    pub fn set_transition(
        &mut self,
        from: CityIndex,
        to: CityIndex,
        allowed: bool,
    ) -> Result<(), MaskError> {
        self.check_range(from, to)?;
        let (block, bit) = self.locate(from, to);
        if allowed {
            self.blocks[block] |= bit;
        } else {
            self.blocks[block] &= !bit;
        }
        Ok(())
    }

    /// Returns `true` if the transition `from -> to` is allowed.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn is_transition_allowed(&self, from: CityIndex, to: CityIndex) -> bool {
        assert!(
            from.get() < self.num_cities && to.get() < self.num_cities,
            "called `ConnectionMask::is_transition_allowed` with ({}, {}) but the mask covers {} cities",
            from.get(),
            to.get(),
            self.num_cities
        );

        let (block, bit) = self.locate(from, to);
        self.blocks[block] & bit != 0
    }

    /// Overwrites the whole `C × C` range from the given domain provider.
    ///
    /// Every transition is rewritten, so anything the provider no longer
    /// admits is recorded as forbidden even if it was allowed before.
    ///
    /// # Panics
    ///
    /// Panics if the provider reports a different number of cities.
    pub fn snapshot_from_domains<D>(&mut self, domains: &D)
    where
        D: SuccessorDomains + ?Sized,
    {
        assert_eq!(
            domains.num_cities(),
            self.num_cities,
            "called `ConnectionMask::snapshot_from_domains` with a provider over {} cities on a mask over {} cities",
            domains.num_cities(),
            self.num_cities
        );

        let n = self.num_cities;
        for from in 0..n {
            let from_index = CityIndex::new(from);
            for to in 0..n {
                let to_index = CityIndex::new(to);
                let (block, bit) = self.locate(from_index, to_index);
                if domains.contains(from_index, to_index) {
                    self.blocks[block] |= bit;
                } else {
                    self.blocks[block] &= !bit;
                }
            }
        }
    }

    /// Returns an iterator over the allowed successors of `from`, self excluded.
    pub fn allowed_successors(&self, from: CityIndex) -> impl Iterator<Item = CityIndex> + '_ {
        (0..self.num_cities)
            .map(CityIndex::new)
            .filter(move |&to| to != from && self.is_transition_allowed(from, to))
    }

    /// Returns the number of allowed transitions, self transitions excluded.
    pub fn count_allowed(&self) -> usize {
        (0..self.num_cities)
            .map(CityIndex::new)
            .map(|from| self.allowed_successors(from).count())
            .sum()
    }

    /// Returns the first city that has no allowed successor, if any.
    pub fn first_dead_end(&self) -> Option<CityIndex> {
        (0..self.num_cities)
            .map(CityIndex::new)
            .find(|&from| self.allowed_successors(from).next().is_none())
    }

    #[inline(always)]
    fn check_range(&self, from: CityIndex, to: CityIndex) -> Result<(), MaskError> {
        if from.get() >= self.num_cities || to.get() >= self.num_cities {
            return Err(MaskError::IndexOutOfRange {
                from: from.get(),
                to: to.get(),
                num_cities: self.num_cities,
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn locate(&self, from: CityIndex, to: CityIndex) -> (usize, u64) {
        let idx = from.get() * self.num_cities + to.get();
        let block = idx / BLOCK_BITS;
        let bit = 1u64 << (BLOCK_BITS - 1 - (idx % BLOCK_BITS));
        (block, bit)
    }
}

impl std::fmt::Debug for ConnectionMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionMask")
            .field("num_cities", &self.num_cities)
            .field("num_blocks", &self.blocks.len())
            .finish()
    }
}

impl std::fmt::Display for ConnectionMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for block in &self.blocks {
            writeln!(f, "{:064b}", block)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ci(i: usize) -> CityIndex {
        CityIndex::new(i)
    }

    /// Domains given as explicit successor lists.
    struct ListDomains(Vec<Vec<usize>>);

    impl SuccessorDomains for ListDomains {
        fn num_cities(&self) -> usize {
            self.0.len()
        }

        fn contains(&self, from: CityIndex, to: CityIndex) -> bool {
            self.0[from.get()].contains(&to.get())
        }
    }

    #[test]
    fn test_block_count() {
        assert_eq!(ConnectionMask::blocks_for(0), 0);
        assert_eq!(ConnectionMask::blocks_for(8), 1);
        assert_eq!(ConnectionMask::blocks_for(9), 2);
        assert_eq!(ConnectionMask::blocks_for(76), 91);
        assert_eq!(ConnectionMask::new(76).blocks().len(), 91);
    }

    #[test]
    fn test_msb_first_layout() {
        let mut mask = ConnectionMask::new(3);
        // idx = 0 * 3 + 1 = 1 -> bit 62 of block 0
        mask.set_transition(ci(0), ci(1), false).unwrap();
        assert_eq!(mask.blocks()[0], !(1u64 << 62));

        let mut mask = ConnectionMask::new(9);
        // idx = 7 * 9 + 2 = 65 -> block 1, bit 62
        mask.set_transition(ci(7), ci(2), false).unwrap();
        assert_eq!(mask.blocks()[0], u64::MAX);
        assert_eq!(mask.blocks()[1], !(1u64 << 62));
    }

    #[test]
    fn test_out_of_range_is_reported() {
        let mut mask = ConnectionMask::new(4);
        let err = mask.set_transition(ci(4), ci(0), false).unwrap_err();
        assert_eq!(
            err,
            MaskError::IndexOutOfRange {
                from: 4,
                to: 0,
                num_cities: 4
            }
        );
    }

    #[test]
    #[should_panic(expected = "called `ConnectionMask::is_transition_allowed` with (0, 9)")]
    fn test_out_of_range_query_panics() {
        let mask = ConnectionMask::new(4);
        mask.is_transition_allowed(ci(0), ci(9));
    }

    #[test]
    fn test_snapshot_is_full_overwrite() {
        let mut mask = ConnectionMask::new(3);
        mask.snapshot_from_domains(&ListDomains(vec![vec![1], vec![2], vec![0]]));
        mask.snapshot_from_domains(&ListDomains(vec![vec![2], vec![0], vec![1]]));

        assert!(mask.is_transition_allowed(ci(0), ci(2)));
        assert!(!mask.is_transition_allowed(ci(0), ci(1)));
        assert!(mask.is_transition_allowed(ci(1), ci(0)));
        assert!(!mask.is_transition_allowed(ci(1), ci(2)));
        assert!(mask.is_transition_allowed(ci(2), ci(1)));
        assert!(!mask.is_transition_allowed(ci(2), ci(0)));
    }

    #[test]
    fn test_successor_queries_and_dead_ends() {
        let mask = ConnectionMask::from_domains(&ListDomains(vec![vec![1, 2], vec![], vec![0]]));
        assert_eq!(
            mask.allowed_successors(ci(0)).collect::<Vec<_>>(),
            vec![ci(1), ci(2)]
        );
        assert_eq!(mask.count_allowed(), 3);
        assert_eq!(mask.first_dead_end(), Some(ci(1)));
        assert_eq!(ConnectionMask::new(3).first_dead_end(), None);
    }

    proptest! {
        #[test]
        fn prop_fresh_mask_is_open(n in 1usize..40) {
            let mask = ConnectionMask::new(n);
            for i in 0..n {
                for j in 0..n {
                    if i != j {
                        prop_assert!(mask.is_transition_allowed(ci(i), ci(j)));
                    }
                }
            }
        }

        #[test]
        fn prop_clearing_is_directed(n in 2usize..40, a in 0usize..40, b in 0usize..40) {
            let i = a % n;
            let j = b % n;
            prop_assume!(i != j);

            let mut mask = ConnectionMask::new(n);
            mask.set_transition(ci(i), ci(j), false).unwrap();
            prop_assert!(!mask.is_transition_allowed(ci(i), ci(j)));
            prop_assert!(mask.is_transition_allowed(ci(j), ci(i)));
            prop_assert_eq!(mask.count_allowed(), n * (n - 1) - 1);
        }
    }
}
