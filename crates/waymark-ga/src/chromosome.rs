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

//! Permutation genomes and evaluated individuals.
//!
//! A `Chromosome` is a permutation of `0..C`, read as the visiting order of
//! a closed tour. A `Phenotype` pairs a chromosome with its fitness and the
//! generation it was born in, so the engine can retire individuals that
//! outlived the configured maximum age.

use rand::{Rng, seq::SliceRandom};
use waymark_model::{index::CityIndex, tour::is_permutation};

/// A permutation of all cities.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Chromosome {
    genes: Vec<CityIndex>,
}

impl Chromosome {
    /// Creates the identity permutation `0, 1, ..., num_cities - 1`.
    #[inline]
    pub fn identity(num_cities: usize) -> Self {
        Self {
            genes: (0..num_cities).map(CityIndex::new).collect(),
        }
    }

    /// Creates a uniformly random permutation.
    #[inline]
    pub fn random<R>(num_cities: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut chromosome = Self::identity(num_cities);
        chromosome.genes.shuffle(rng);
        chromosome
    }

    /// Wraps an existing visiting order.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `genes` is not a permutation of `0..genes.len()`.
    #[inline]
    pub fn from_genes(genes: Vec<CityIndex>) -> Self {
        debug_assert!(
            is_permutation(&genes),
            "called `Chromosome::from_genes` with genes that are not a permutation: {:?}",
            genes
        );

        Self { genes }
    }

    #[inline]
    pub fn genes(&self) -> &[CityIndex] {
        &self.genes
    }

    #[inline]
    pub(crate) fn genes_mut(&mut self) -> &mut [CityIndex] {
        &mut self.genes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    #[inline]
    pub fn into_genes(self) -> Vec<CityIndex> {
        self.genes
    }
}

impl std::fmt::Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (k, city) in self.genes.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", city.get())?;
        }
        write!(f, "]")
    }
}

/// An evaluated chromosome.
#[derive(Clone, Debug, PartialEq)]
pub struct Phenotype {
    chromosome: Chromosome,
    fitness: f64,
    birth_generation: u64,
}

impl Phenotype {
    #[inline]
    pub fn new(chromosome: Chromosome, fitness: f64, birth_generation: u64) -> Self {
        Self {
            chromosome,
            fitness,
            birth_generation,
        }
    }

    #[inline]
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    /// Returns the closed tour length, or `INFEASIBLE_FITNESS`.
    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[inline]
    pub fn birth_generation(&self) -> u64 {
        self.birth_generation
    }

    /// Returns the number of generations this individual has been alive at
    /// `generation`.
    #[inline]
    pub fn age(&self, generation: u64) -> u64 {
        generation.saturating_sub(self.birth_generation)
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.fitness < crate::fitness::INFEASIBLE_FITNESS
    }

    #[inline]
    pub fn into_chromosome(self) -> Chromosome {
        self.chromosome
    }

    #[inline]
    pub(crate) fn genes_mut(&mut self) -> &mut [CityIndex] {
        self.chromosome.genes_mut()
    }

    /// Records a new evaluation after the genes were altered.
    #[inline]
    pub(crate) fn set_evaluation(&mut self, fitness: f64, birth_generation: u64) {
        self.fitness = fitness;
        self.birth_generation = birth_generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_identity_and_random_are_permutations() {
        let identity = Chromosome::identity(6);
        assert_eq!(identity.len(), 6);
        assert_eq!(identity.genes()[3], CityIndex::new(3));

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..20 {
            let chromosome = Chromosome::random(12, &mut rng);
            assert!(is_permutation(chromosome.genes()));
        }
    }

    #[test]
    fn test_display() {
        let chromosome =
            Chromosome::from_genes(vec![CityIndex::new(2), CityIndex::new(0), CityIndex::new(1)]);
        assert_eq!(chromosome.to_string(), "[2, 0, 1]");
        assert_eq!(Chromosome::identity(0).to_string(), "[]");
    }

    #[test]
    fn test_phenotype_age_and_feasibility() {
        let phenotype = Phenotype::new(Chromosome::identity(3), 12.0, 4);
        assert_eq!(phenotype.age(4), 0);
        assert_eq!(phenotype.age(10), 6);
        assert_eq!(phenotype.age(1), 0);
        assert!(phenotype.is_feasible());

        let infeasible =
            Phenotype::new(Chromosome::identity(3), crate::fitness::INFEASIBLE_FITNESS, 0);
        assert!(!infeasible.is_feasible());
    }
}
