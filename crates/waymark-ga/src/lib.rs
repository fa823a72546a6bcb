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

//! Waymark-GA: evolutionary search over tours
//!
//! A permutation genetic algorithm and the refiner loop that drives it from
//! the exact search's published connection masks.
//!
//! Core flow
//! - Price permutations with a `fitness::PermutationFitness`, usually a
//!   `ClosedTourFitness` over a (possibly mask-restricted) `EdgeCostModel`.
//! - Run `engine::EvolutionEngine` for a fixed number of generations,
//!   observing it through `monitor::evolution_monitor::EvolutionMonitor`.
//! - Or let `refiner::EvolutionaryRefiner` repeat restricted passes until the
//!   coordination state requests a stop.
//!
//! Module map
//! - `chromosome`: permutation genomes and evaluated phenotypes.
//! - `config`: `EvolutionConfig` and its validation.
//! - `engine`: the generation loop.
//! - `fitness`: closed tour fitness and `INFEASIBLE_FITNESS`.
//! - `monitor`: evolution monitors (no-op, composite, log, coordination).
//! - `operators`: swap mutation and partially matched crossover.
//! - `refiner`: the mask-restricted refiner loop.
//! - `result`, `stats`: outcomes and counters.
//! - `selection`: tournament selection.

pub mod chromosome;
pub mod config;
pub mod engine;
pub mod fitness;
pub mod monitor;
pub mod operators;
pub mod refiner;
pub mod result;
pub mod selection;
pub mod stats;
