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

//! Waymark-Solver: the hybrid travelling salesman solver
//!
//! Couples a portfolio of exact branch and bound workers with an
//! evolutionary refiner through a single `SharedCoordinationState`.
//!
//! Core flow
//! - Load a `DistanceMatrix` and a `config::HybridConfig`.
//! - Build a `solver::HybridSolver` and call `solve_with`, receiving every
//!   improvement of the best distance together with its source.
//! - The exact workers publish connection masks sampled from their search
//!   frontier; the refiner runs restricted evolutionary passes on the latest
//!   one and reports what it finds. Both sides lower the same best distance.
//!
//! Module map
//! - `config`: `HybridConfig` and `ConfigError`.
//! - `coordinator`: `ExactSearchCoordinator` and the portfolio event stream.
//! - `solver`: `HybridSolver`, `HybridOutcome` and improvement events.

pub mod config;
pub mod coordinator;
pub mod solver;
