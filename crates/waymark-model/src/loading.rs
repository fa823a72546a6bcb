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

//! Distance matrix loader.
//!
//! Turns a comma separated text stream into a validated `DistanceMatrix`.
//! Each non-empty line is one row. Curly braces are stripped so both plain
//! CSV and brace decorated literals such as `{0, 12, 7},` are accepted, and
//! lines starting with `//` are comments. Empty cells at the end of a row,
//! as left by a trailing comma, are ignored; an empty cell followed by a
//! value is a parse error.
//!
//! The row count fixes the number of cities; every row must have exactly
//! that many entries and every entry must be a non-negative integer below
//! the maximum of the cost type, which marks forbidden edges.

use crate::matrix::DistanceMatrix;
use num_traits::{PrimInt, Signed};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

/// The error type for the matrix loading process.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// An I/O error occurred while reading the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The input contained no rows.
    #[error("the input contains no matrix rows")]
    Empty,
    /// A cell could not be parsed into the cost type.
    #[error("line {line}, column {column}: could not parse `{token}` as {type_name}")]
    Parse {
        line: usize,
        column: usize,
        token: String,
        type_name: &'static str,
    },
    /// A row has a different number of entries than the first row.
    #[error("line {line}: expected {expected} entries, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// The number of rows differs from the number of columns.
    #[error("matrix has {rows} rows but {columns} columns")]
    NotSquare { rows: usize, columns: usize },
    /// A cost is negative.
    #[error("line {line}, column {column}: negative cost")]
    NegativeCost { line: usize, column: usize },
    /// A cost equals the forbidden-edge sentinel `T::max_value()`.
    #[error("line {line}, column {column}: cost collides with the forbidden-edge sentinel")]
    ReservedCost { line: usize, column: usize },
    /// The matrix describes fewer than two cities.
    #[error("a tour needs at least 2 cities, the matrix has {0}")]
    TooFewCities(usize),
}

/// Reads distance matrices from text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixLoader;

impl MatrixLoader {
    /// Creates a new `MatrixLoader`.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Loads a matrix from a type implementing `BufRead`.
    pub fn from_bufread<T, R>(&self, rdr: R) -> Result<DistanceMatrix<T>, LoaderError>
    where
        T: PrimInt + Signed + FromStr,
        R: BufRead,
    {
        let mut costs: Vec<T> = Vec::new();
        let mut columns: Option<usize> = None;
        let mut rows = 0usize;

        for (line_index, line) in rdr.lines().enumerate() {
            let line = line?;
            let line_number = line_index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            let stripped: String = trimmed.chars().filter(|c| *c != '{' && *c != '}').collect();
            let mut cells: Vec<&str> = stripped.split(',').map(str::trim).collect();
            while cells.last().is_some_and(|cell| cell.is_empty()) {
                cells.pop();
            }

            let row_start = costs.len();
            for (column_index, cell) in cells.into_iter().enumerate() {
                let column = column_index + 1;
                let value: T = cell.parse().map_err(|_| LoaderError::Parse {
                    line: line_number,
                    column,
                    token: cell.to_owned(),
                    type_name: std::any::type_name::<T>(),
                })?;
                if value < T::zero() {
                    return Err(LoaderError::NegativeCost {
                        line: line_number,
                        column,
                    });
                }
                if value == T::max_value() {
                    return Err(LoaderError::ReservedCost {
                        line: line_number,
                        column,
                    });
                }
                costs.push(value);
            }

            let found = costs.len() - row_start;
            if found == 0 {
                continue;
            }

            match columns {
                None => columns = Some(found),
                Some(expected) if expected != found => {
                    return Err(LoaderError::Ragged {
                        line: line_number,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
            rows += 1;
        }

        let columns = columns.ok_or(LoaderError::Empty)?;
        if rows != columns {
            return Err(LoaderError::NotSquare { rows, columns });
        }
        if rows < 2 {
            return Err(LoaderError::TooFewCities(rows));
        }

        tracing::debug!(num_cities = rows, "loaded distance matrix");
        Ok(DistanceMatrix::from_flat(rows, costs))
    }

    /// Loads a matrix from a file path.
    #[inline]
    pub fn from_path<T, P>(&self, path: P) -> Result<DistanceMatrix<T>, LoaderError>
    where
        T: PrimInt + Signed + FromStr,
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    /// Loads a matrix from a generic reader.
    #[inline]
    pub fn from_reader<T, R>(&self, r: R) -> Result<DistanceMatrix<T>, LoaderError>
    where
        T: PrimInt + Signed + FromStr,
        R: Read,
    {
        self.from_bufread(BufReader::new(r))
    }

    /// Loads a matrix from a string slice.
    #[inline]
    pub fn from_str<T>(&self, s: &str) -> Result<DistanceMatrix<T>, LoaderError>
    where
        T: PrimInt + Signed + FromStr,
    {
        self.from_reader(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CityIndex;

    const BRACED: &str = r#"
        // three cities
        {0, 12, 7},
        {12, 0, 3},

        {7, 3, 0}
    "#;

    #[test]
    fn test_loads_braced_rows() {
        let matrix: DistanceMatrix<i64> = MatrixLoader::new().from_str(BRACED).unwrap();
        assert_eq!(matrix.num_cities(), 3);
        assert_eq!(matrix.cost(CityIndex::new(0), CityIndex::new(1)), 12);
        assert_eq!(matrix.cost(CityIndex::new(2), CityIndex::new(1)), 3);
    }

    #[test]
    fn test_loads_plain_csv() {
        let matrix: DistanceMatrix<i32> = MatrixLoader::new().from_str("0,1\n2,0\n").unwrap();
        assert_eq!(matrix.cost(CityIndex::new(1), CityIndex::new(0)), 2);
    }

    #[test]
    fn test_parse_error_structure() {
        let res = MatrixLoader::new().from_str::<i64>("0, 1\n1, x\n");
        match res {
            Err(LoaderError::Parse {
                line,
                column,
                token,
                type_name,
            }) => {
                assert_eq!(line, 2);
                assert_eq!(column, 2);
                assert_eq!(token, "x");
                assert!(type_name.contains("i64"));
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_errors() {
        let loader = MatrixLoader::new();
        assert!(matches!(
            loader.from_str::<i64>("0, 1\n1\n"),
            Err(LoaderError::Ragged {
                line: 2,
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            loader.from_str::<i64>("0, 1, 2\n1, 0, 2\n"),
            Err(LoaderError::NotSquare { rows: 2, columns: 3 })
        ));
        assert!(matches!(
            loader.from_str::<i64>("// nothing\n\n"),
            Err(LoaderError::Empty)
        ));
        assert!(matches!(
            loader.from_str::<i64>("{0}"),
            Err(LoaderError::TooFewCities(1))
        ));
    }

    #[test]
    fn test_negative_cost_is_rejected() {
        let res = MatrixLoader::new().from_str::<i64>("0, -1\n1, 0\n");
        assert!(matches!(
            res,
            Err(LoaderError::NegativeCost { line: 1, column: 2 })
        ));
    }

    #[test]
    fn test_interior_empty_cell_is_rejected() {
        let res = MatrixLoader::new().from_str::<i64>("0,,5,3\n5,0,2\n3,2,0\n");
        match res {
            Err(LoaderError::Parse {
                line,
                column,
                token,
                ..
            }) => {
                assert_eq!(line, 1);
                assert_eq!(column, 2);
                assert!(token.is_empty());
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_commas_are_ignored() {
        let matrix: DistanceMatrix<i64> =
            MatrixLoader::new().from_str("0, 4,,\n4, 0,\n").unwrap();
        assert_eq!(matrix.num_cities(), 2);
        assert_eq!(matrix.cost(CityIndex::new(1), CityIndex::new(0)), 4);
    }

    #[test]
    fn test_sentinel_cost_is_rejected() {
        let input = format!("0, {}\n1, 0\n", i64::MAX);
        assert!(matches!(
            MatrixLoader::new().from_str::<i64>(&input),
            Err(LoaderError::ReservedCost { line: 1, column: 2 })
        ));
        let input = format!("0, {}\n1, 0\n", i32::MAX - 1);
        assert!(MatrixLoader::new().from_str::<i32>(&input).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let res = MatrixLoader::new().from_path::<i64, _>("/definitely/not/here.txt");
        assert!(matches!(res, Err(LoaderError::Io(_))));
    }
}
