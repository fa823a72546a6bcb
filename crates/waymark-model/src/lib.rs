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

//! # Waymark Model
//!
//! **The domain model for the waymark TSP solver.**
//!
//! This crate defines the data shared between the exact search, the
//! evolutionary search and the coordination layer that connects them.
//!
//! * **`index`**: `CityIndex`, a strongly typed city position.
//! * **`matrix`**: `DistanceMatrix`, the immutable base cost table.
//! * **`mask`**: `ConnectionMask`, the packed transition bitset exchanged
//!   between the two searches, and the `SuccessorDomains` provider trait.
//! * **`costs`**: `EdgeCostModel`, base costs plus a sentinel-restricted view.
//! * **`model`**: `Model` and `ModelBuilder` for the exact search.
//! * **`tour`**: `Tour`, a closed tour with its length.
//! * **`loading`** and **`coordinates`**: text input tooling.

pub mod coordinates;
pub mod costs;
pub mod index;
pub mod loading;
pub mod mask;
pub mod matrix;
pub mod model;
pub mod tour;
