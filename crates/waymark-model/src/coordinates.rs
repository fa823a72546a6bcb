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

//! Coordinate list conversion.
//!
//! Reads `id x y` records, one per line, and renders the coordinates as
//! brace literals `{x, y}` joined by `, `. Lines that do not consist of
//! exactly three whitespace separated fields are skipped.

use std::io::BufRead;

/// The error type for coordinate conversion.
#[derive(Debug, thiserror::Error)]
pub enum CoordinateError {
    /// An I/O error occurred while reading the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A coordinate is not an integer.
    #[error("line {line}: could not parse `{token}` as a coordinate")]
    Parse { line: usize, token: String },
}

/// Converts `id x y` records into `{x, y}` literals.
pub fn to_literals<R: BufRead>(rdr: R) -> Result<String, CoordinateError> {
    let mut literals = Vec::new();
    for (line_index, line) in rdr.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [_, x, y] = fields.as_slice() else {
            continue;
        };

        let parse = |token: &str| {
            token.parse::<i64>().map_err(|_| CoordinateError::Parse {
                line: line_index + 1,
                token: token.to_owned(),
            })
        };
        literals.push(format!("{{{}, {}}}", parse(*x)?, parse(*y)?));
    }
    Ok(literals.join(", "))
}

/// Converts coordinates held in a string slice.
#[inline]
pub fn str_to_literals(s: &str) -> Result<String, CoordinateError> {
    to_literals(s.as_bytes())
}
