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

//! # Solver Numeric Trait
//!
//! Unified numeric bounds for the exact search and the portfolio. Collects
//! the integer capabilities the solver needs (`PrimInt`, `Signed`,
//! conversions from primitives and into `i64` for atomic incumbent bounds,
//! parsing from text) into a single alias so that generic signatures stay
//! short. `PrimInt` already brings checked and saturating arithmetic.
//!
//! Note: `i128` is excluded since it does not convert into `i64`.

use num_traits::{FromPrimitive, PrimInt, Signed};
use std::{hash::Hash, str::FromStr};

/// A trait alias for integer types usable as tour costs.
/// In practice these are `i8`, `i16`, `i32` and `i64`.
pub trait SolverNumeric:
    PrimInt
    + Signed
    + FromPrimitive
    + Into<i64>
    + FromStr
    + std::fmt::Debug
    + std::fmt::Display
    + Send
    + Sync
    + Hash
    + 'static
{
}

impl<T> SolverNumeric for T where
    T: PrimInt
        + Signed
        + FromPrimitive
        + Into<i64>
        + FromStr
        + std::fmt::Debug
        + std::fmt::Display
        + Send
        + Sync
        + Hash
        + 'static
{
}

/// Converts an `i64` bound into `T`, saturating at `T::max_value()`.
#[inline]
pub fn saturating_from_i64<T>(value: i64) -> T
where
    T: SolverNumeric,
{
    T::from_i64(value).unwrap_or_else(T::max_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_numeric<T: SolverNumeric>() {}

    #[test]
    fn test_signed_primitives_are_numeric() {
        assert_numeric::<i16>();
        assert_numeric::<i32>();
        assert_numeric::<i64>();
    }

    #[test]
    fn test_saturating_from_i64() {
        assert_eq!(saturating_from_i64::<i32>(17), 17);
        assert_eq!(saturating_from_i64::<i32>(i64::MAX), i32::MAX);
        assert_eq!(saturating_from_i64::<i64>(i64::MAX), i64::MAX);
    }
}
