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

//! Evolution parameters.
//!
//! Defaults: a population of 50, 60% of which is bred each generation by
//! tournaments of 3, swap mutation and partially matched crossover at 0.15
//! each, and individuals retired after 70 generations.

use serde::{Deserialize, Serialize};

/// Parameters of an `EvolutionEngine`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of individuals per generation.
    pub population_size: usize,
    /// Share of each generation produced by selection and alteration; the
    /// rest survives unchanged.
    pub offspring_fraction: f64,
    /// Individuals drawn per selection tournament.
    pub tournament_size: usize,
    /// Per-gene swap probability.
    pub mutation_probability: f64,
    /// Probability that a pair of offspring is recombined.
    pub crossover_probability: f64,
    /// Individuals older than this many generations are replaced by fresh
    /// random ones.
    pub max_phenotype_age: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            offspring_fraction: 0.6,
            tournament_size: 3,
            mutation_probability: 0.15,
            crossover_probability: 0.15,
            max_phenotype_age: 70,
        }
    }
}

/// Why an `EvolutionConfig` was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEvolutionConfig {
    PopulationSize,
    OffspringFraction,
    TournamentSize,
    MutationProbability,
    CrossoverProbability,
    MaxPhenotypeAge,
}

impl InvalidEvolutionConfig {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            InvalidEvolutionConfig::PopulationSize => "population_size",
            InvalidEvolutionConfig::OffspringFraction => "offspring_fraction",
            InvalidEvolutionConfig::TournamentSize => "tournament_size",
            InvalidEvolutionConfig::MutationProbability => "mutation_probability",
            InvalidEvolutionConfig::CrossoverProbability => "crossover_probability",
            InvalidEvolutionConfig::MaxPhenotypeAge => "max_phenotype_age",
        }
    }
}

impl std::fmt::Display for InvalidEvolutionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let requirement = match self {
            InvalidEvolutionConfig::PopulationSize => "must be at least 2",
            InvalidEvolutionConfig::OffspringFraction
            | InvalidEvolutionConfig::MutationProbability
            | InvalidEvolutionConfig::CrossoverProbability => "must lie in [0, 1]",
            InvalidEvolutionConfig::TournamentSize | InvalidEvolutionConfig::MaxPhenotypeAge => {
                "must be positive"
            }
        };
        write!(f, "`{}` {}", self.field(), requirement)
    }
}

impl std::error::Error for InvalidEvolutionConfig {}

#[inline]
fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl EvolutionConfig {
    #[inline]
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    #[inline]
    pub fn with_offspring_fraction(mut self, offspring_fraction: f64) -> Self {
        self.offspring_fraction = offspring_fraction;
        self
    }

    #[inline]
    pub fn with_tournament_size(mut self, tournament_size: usize) -> Self {
        self.tournament_size = tournament_size;
        self
    }

    #[inline]
    pub fn with_mutation_probability(mut self, mutation_probability: f64) -> Self {
        self.mutation_probability = mutation_probability;
        self
    }

    #[inline]
    pub fn with_crossover_probability(mut self, crossover_probability: f64) -> Self {
        self.crossover_probability = crossover_probability;
        self
    }

    #[inline]
    pub fn with_max_phenotype_age(mut self, max_phenotype_age: u64) -> Self {
        self.max_phenotype_age = max_phenotype_age;
        self
    }

    /// Number of offspring bred per generation.
    #[inline]
    pub fn offspring_count(&self) -> usize {
        let raw = (self.population_size as f64 * self.offspring_fraction).round() as usize;
        raw.min(self.population_size)
    }

    /// Number of survivors carried over per generation.
    #[inline]
    pub fn survivor_count(&self) -> usize {
        self.population_size - self.offspring_count()
    }

    /// Checks every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), InvalidEvolutionConfig> {
        if self.population_size < 2 {
            return Err(InvalidEvolutionConfig::PopulationSize);
        }
        if !is_probability(self.offspring_fraction) {
            return Err(InvalidEvolutionConfig::OffspringFraction);
        }
        if self.tournament_size == 0 {
            return Err(InvalidEvolutionConfig::TournamentSize);
        }
        if !is_probability(self.mutation_probability) {
            return Err(InvalidEvolutionConfig::MutationProbability);
        }
        if !is_probability(self.crossover_probability) {
            return Err(InvalidEvolutionConfig::CrossoverProbability);
        }
        if self.max_phenotype_age == 0 {
            return Err(InvalidEvolutionConfig::MaxPhenotypeAge);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EvolutionConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.offspring_count(), 30);
        assert_eq!(config.survivor_count(), 20);
    }

    #[test]
    fn test_validate_reports_first_invalid_field() {
        let config = EvolutionConfig::default()
            .with_mutation_probability(1.5)
            .with_max_phenotype_age(0);
        let err = config.validate().unwrap_err();
        assert_eq!(err, InvalidEvolutionConfig::MutationProbability);
        assert_eq!(err.to_string(), "`mutation_probability` must lie in [0, 1]");

        assert_eq!(
            EvolutionConfig::default().with_population_size(1).validate(),
            Err(InvalidEvolutionConfig::PopulationSize)
        );
        assert_eq!(
            EvolutionConfig::default()
                .with_offspring_fraction(f64::NAN)
                .validate(),
            Err(InvalidEvolutionConfig::OffspringFraction)
        );
    }

    #[test]
    fn test_offspring_count_is_clamped() {
        let config = EvolutionConfig::default()
            .with_population_size(10)
            .with_offspring_fraction(1.0);
        assert_eq!(config.offspring_count(), 10);
        assert_eq!(config.survivor_count(), 0);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: EvolutionConfig =
            serde_json::from_str(r#"{ "population_size": 80, "tournament_size": 5 }"#)
                .expect("valid json");
        assert_eq!(config.population_size, 80);
        assert_eq!(config.tournament_size, 5);
        assert_eq!(config.max_phenotype_age, 70);
        assert_eq!(config.mutation_probability, 0.15);
    }
}
