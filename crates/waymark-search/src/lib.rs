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

//! # Waymark Search
//!
//! Shared infrastructure for the waymark solvers.
//!
//! * **`coordination`**: `SharedCoordinationState`, the rendezvous between the
//!   exact search portfolio and the evolutionary refiner.
//! * **`incumbent`**: `SharedIncumbent`, the best exact tour across portfolio workers.
//! * **`monitor`**: portfolio-level search monitors.
//! * **`portfolio`**: the `PortfolioSolver` contract.
//! * **`result`** and **`stats`**: solver outcomes and statistics.
//! * **`num`**: the `SolverNumeric` bound.

pub mod coordination;
pub mod incumbent;
pub mod monitor;
pub mod num;
pub mod portfolio;
pub mod result;
pub mod stats;
