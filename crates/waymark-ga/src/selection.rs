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

use crate::chromosome::Phenotype;
use rand::Rng;

/// Draws `tournament_size` individuals uniformly with replacement and
/// returns the index of the fittest (lowest fitness). Ties go to the
/// earliest draw.
///
/// # Panics
///
/// Panics if `population` is empty or `tournament_size` is zero.
pub fn tournament<R>(population: &[Phenotype], tournament_size: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    assert!(
        !population.is_empty() && tournament_size > 0,
        "called `tournament` with a population of {} and a tournament size of {}",
        population.len(),
        tournament_size
    );

    let mut winner = rng.random_range(0..population.len());
    for _ in 1..tournament_size {
        let challenger = rng.random_range(0..population.len());
        if population[challenger].fitness() < population[winner].fitness() {
            winner = challenger;
        }
    }
    winner
}

/// Returns the index of the fittest individual, `None` for an empty slice.
#[inline]
pub fn fittest(population: &[Phenotype]) -> Option<usize> {
    population
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.fitness().total_cmp(&b.fitness()))
        .map(|(index, _)| index)
}
