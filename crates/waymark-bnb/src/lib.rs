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

//! Waymark-BnB: exact search for the travelling salesman problem
//!
//! A branch and bound solver that grows tours from city 0 over per-city
//! successor domains. Branching order is pluggable, monitors observe and
//! control the run, and a portfolio adapter lets several differently
//! ordered searches share one incumbent.
//!
//! Core flow
//! - Build a `waymark_model::model::Model<T>`, optionally with a ceiling.
//! - Choose a `branching::decision::DecisionBuilder`.
//! - Run `bnb::BnbSolver` directly, or integrate via `portfolio`.
//!
//! Design highlights
//! - Tight inner loop: state is mutated in place and restored via a trail.
//! - The lower bound adds the cheapest remaining successor of every open city
//!   to the partial tour cost; an empty domain prunes the node outright.
//! - The ceiling is a strict bound: tours of exactly that length are rejected.
//! - `monitor::frontier` turns the live successor domains into
//!   `ConnectionMask` snapshots for the evolutionary side of the hybrid solver.
//!
//! Module map
//! - `bnb`: the solver engine and session orchestration.
//! - `branching`: decision builders.
//! - `monitor`: tree search monitors (log, composite, wrapper, frontier).
//! - `portfolio`: adapter to the `waymark_search` portfolio API.
//! - `result`: solver outcomes with termination reasons.
//! - `state`: successor domains and the partial path.
//! - `stats`: lightweight counters and timing.

pub mod bnb;
pub mod branching;
mod incumbent;
pub mod monitor;
pub mod portfolio;
pub mod result;
mod stack;
pub mod state;
pub mod stats;
mod trail;
