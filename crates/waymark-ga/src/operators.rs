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

//! Permutation-preserving alterers.
//!
//! - `swap_mutation`: every gene is, with the given probability, swapped
//!   with a uniformly chosen position.
//! - `partially_matched_crossover`: exchanges a random segment between two
//!   parents and repairs the genes outside the segment through the mapping
//!   the segment defines, so both children stay permutations.

use rand::Rng;
use smallvec::SmallVec;
use waymark_model::index::CityIndex;

/// Lookup tables up to this many cities stay on the stack.
const INLINE_CITIES: usize = 64;

const UNMAPPED: usize = usize::MAX;

/// Swaps each gene with probability `probability` with a random position.
/// Returns the number of swaps performed.
pub fn swap_mutation<R>(genes: &mut [CityIndex], probability: f64, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let n = genes.len();
    if n < 2 || probability <= 0.0 {
        return 0;
    }

    let mut swaps = 0;
    for i in 0..n {
        if rng.random_bool(probability.min(1.0)) {
            let j = rng.random_range(0..n);
            if i != j {
                genes.swap(i, j);
                swaps += 1;
            }
        }
    }
    swaps
}

/// Applies partially matched crossover to `first` and `second` in place,
/// using a segment chosen at random.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn partially_matched_crossover<R>(first: &mut [CityIndex], second: &mut [CityIndex], rng: &mut R)
where
    R: Rng + ?Sized,
{
    assert_eq!(
        first.len(),
        second.len(),
        "called `partially_matched_crossover` with parents of length {} and {}",
        first.len(),
        second.len()
    );

    let n = first.len();
    if n < 2 {
        return;
    }

    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    let (start, end) = if a <= b { (a, b + 1) } else { (b, a + 1) };
    partially_matched_crossover_segment(first, second, start, end);
}

/// Applies partially matched crossover over the segment `start..end`.
///
/// # Panics
///
/// Panics if the parents have different lengths or the segment is out of range.
pub fn partially_matched_crossover_segment(
    first: &mut [CityIndex],
    second: &mut [CityIndex],
    start: usize,
    end: usize,
) {
    let n = first.len();
    assert!(
        second.len() == n && start <= end && end <= n,
        "called `partially_matched_crossover_segment` with segment {}..{} for parents of length {} and {}",
        start,
        end,
        n,
        second.len()
    );

    // into_first[v] = the value that replaces v outside the segment of the
    // first child, i.e. second[k] -> first[k] for k in the segment.
    let mut into_first: SmallVec<[usize; INLINE_CITIES]> = SmallVec::from_elem(UNMAPPED, n);
    let mut into_second: SmallVec<[usize; INLINE_CITIES]> = SmallVec::from_elem(UNMAPPED, n);
    for k in start..end {
        into_first[second[k].get()] = first[k].get();
        into_second[first[k].get()] = second[k].get();
    }

    first[start..end].swap_with_slice(&mut second[start..end]);

    for k in (0..start).chain(end..n) {
        first[k] = CityIndex::new(resolve(&into_first, first[k].get()));
        second[k] = CityIndex::new(resolve(&into_second, second[k].get()));
    }
}

/// Follows the mapping chain until it leaves the exchanged segment.
#[inline]
fn resolve(mapping: &[usize], mut value: usize) -> usize {
    // A chain visits each segment position at most once.
    let mut hops = 0;
    while mapping[value] != UNMAPPED && hops <= mapping.len() {
        value = mapping[value];
        hops += 1;
    }
    value
}
