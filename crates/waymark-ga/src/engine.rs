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

//! Generation-bounded permutation GA.
//!
//! Each generation keeps `survivor_count` individuals chosen by tournament,
//! breeds `offspring_count` more by tournament, recombines consecutive
//! offspring pairs with partially matched crossover, applies swap mutation
//! to every offspring, and re-evaluates whatever changed. Individuals older
//! than `max_phenotype_age` are then replaced by fresh random permutations.
//!
//! The engine keeps its population buffers between runs and owns its random
//! number generator, so a seeded engine is fully reproducible.

use crate::{
    chromosome::{Chromosome, Phenotype},
    config::EvolutionConfig,
    fitness::PermutationFitness,
    monitor::evolution_monitor::{EvolutionMonitor, GenerationReport},
    operators::{partially_matched_crossover, swap_mutation},
    result::{EvolutionOutcome, EvolutionTerminationReason},
    selection::{fittest, tournament},
    stats::EvolutionStatistics,
};
use rand::Rng;
use std::time::Instant;
use waymark_model::{index::CityIndex, tour::Tour};
use waymark_search::monitor::search_monitor::SearchCommand;

/// A genetic algorithm over permutations of `0..C`.
#[derive(Debug, Clone)]
pub struct EvolutionEngine<R> {
    config: EvolutionConfig,
    rng: R,
    population: Vec<Phenotype>,
    next_population: Vec<Phenotype>,
    altered: Vec<bool>,
}

impl<R> EvolutionEngine<R>
where
    R: Rng,
{
    /// Creates an engine.
    ///
    /// # Panics
    ///
    /// Panics if `config` does not validate.
    pub fn new(config: EvolutionConfig, rng: R) -> Self {
        if let Err(invalid) = config.validate() {
            panic!(
                "called `EvolutionEngine::new` with an invalid config: {}",
                invalid
            );
        }

        Self {
            config,
            rng,
            population: Vec::with_capacity(config.population_size),
            next_population: Vec::with_capacity(config.population_size),
            altered: Vec::with_capacity(config.offspring_count()),
        }
    }

    #[inline]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Returns the population left behind by the last run.
    #[inline]
    pub fn population(&self) -> &[Phenotype] {
        &self.population
    }

    /// Evolves a fresh random population for at most `generations`
    /// generations.
    ///
    /// # Panics
    ///
    /// Panics if the fitness covers fewer than two cities.
    pub fn run<F, M>(
        &mut self,
        fitness: &F,
        generations: u64,
        mut monitor: M,
    ) -> EvolutionOutcome<F::Objective>
    where
        F: PermutationFitness,
        M: EvolutionMonitor,
    {
        let start_time = Instant::now();
        let num_cities = fitness.num_cities();
        assert!(
            num_cities >= 2,
            "called `EvolutionEngine::run` with {} cities, but a tour needs at least 2",
            num_cities
        );

        let mut stats = EvolutionStatistics::default();
        monitor.on_start(num_cities);

        self.population.clear();
        for _ in 0..self.config.population_size {
            let chromosome = Chromosome::random(num_cities, &mut self.rng);
            let value = evaluate(fitness, chromosome.genes(), &mut stats);
            self.population.push(Phenotype::new(chromosome, value, 0));
        }

        let mut best = match fittest(&self.population) {
            Some(index) => self.population[index].clone(),
            None => {
                let chromosome = Chromosome::identity(num_cities);
                let value = fitness.evaluate(chromosome.genes());
                Phenotype::new(chromosome, value, 0)
            }
        };

        let mut generation = 0;
        let termination_reason = loop {
            if generation >= generations {
                break EvolutionTerminationReason::GenerationLimit;
            }
            if let SearchCommand::Terminate(reason) = monitor.search_command(&stats) {
                break EvolutionTerminationReason::Aborted(reason);
            }

            generation += 1;
            self.evolve(fitness, generation, &mut stats);

            let Some(index) = fittest(&self.population) else {
                break EvolutionTerminationReason::GenerationLimit;
            };
            let generation_best = self.population[index].fitness();
            if generation_best < best.fitness() {
                best = self.population[index].clone();
                stats.on_improvement();
            }
            stats.on_generation();

            let report = GenerationReport {
                generation,
                best_fitness: generation_best,
                run_best_fitness: best.fitness(),
                feasible_individuals: self.population.iter().filter(|p| p.is_feasible()).count(),
                population_size: self.population.len(),
            };
            monitor.on_generation(&report, &stats);
        };

        stats.set_total_time(start_time.elapsed());
        monitor.on_end(&best, &stats);

        let best_fitness = best.fitness();
        let best_order: Vec<CityIndex> = best.into_chromosome().into_genes();
        let tour = fitness
            .objective(&best_order)
            .map(|objective| Tour::new(objective, best_order.clone()));

        EvolutionOutcome::new(best_order, best_fitness, tour, termination_reason, stats)
    }

    /// Replaces the population by the next generation.
    fn evolve<F>(&mut self, fitness: &F, generation: u64, stats: &mut EvolutionStatistics)
    where
        F: PermutationFitness,
    {
        let survivor_count = self.config.survivor_count();
        let offspring_count = self.config.offspring_count();
        let tournament_size = self.config.tournament_size;

        self.next_population.clear();
        for _ in 0..survivor_count + offspring_count {
            let index = tournament(&self.population, tournament_size, &mut self.rng);
            self.next_population.push(self.population[index].clone());
        }

        self.altered.clear();
        self.altered.resize(offspring_count, false);
        let offspring = &mut self.next_population[survivor_count..];

        let mut k = 0;
        while k + 1 < offspring.len() {
            if self.rng.random_bool(self.config.crossover_probability) {
                let (left, right) = offspring.split_at_mut(k + 1);
                partially_matched_crossover(
                    left[k].genes_mut(),
                    right[0].genes_mut(),
                    &mut self.rng,
                );
                self.altered[k] = true;
                self.altered[k + 1] = true;
                stats.on_crossover();
            }
            k += 2;
        }

        for (child, altered) in offspring.iter_mut().zip(self.altered.iter_mut()) {
            let swaps = swap_mutation(
                child.genes_mut(),
                self.config.mutation_probability,
                &mut self.rng,
            );
            if swaps > 0 {
                *altered = true;
                stats.on_mutations(swaps);
            }
        }

        for (child, _) in offspring
            .iter_mut()
            .zip(self.altered.iter())
            .filter(|(_, altered)| **altered)
        {
            let value = evaluate(fitness, child.chromosome().genes(), stats);
            child.set_evaluation(value, generation);
        }

        let max_age = self.config.max_phenotype_age;
        for individual in self.next_population.iter_mut() {
            if individual.age(generation) > max_age {
                let chromosome = Chromosome::random(individual.chromosome().len(), &mut self.rng);
                let value = evaluate(fitness, chromosome.genes(), stats);
                *individual = Phenotype::new(chromosome, value, generation);
                stats.on_age_replacement();
            }
        }

        std::mem::swap(&mut self.population, &mut self.next_population);
    }
}

#[inline]
fn evaluate<F>(fitness: &F, genes: &[CityIndex], stats: &mut EvolutionStatistics) -> f64
where
    F: PermutationFitness,
{
    let value = fitness.evaluate(genes);
    stats.on_evaluation(value < crate::fitness::INFEASIBLE_FITNESS);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fitness::{ClosedTourFitness, INFEASIBLE_FITNESS},
        monitor::no_op::NoOperationMonitor,
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;
    use waymark_model::{
        costs::EdgeCostModel, mask::ConnectionMask, matrix::DistanceMatrix, tour::is_permutation,
    };

    fn c(i: usize) -> CityIndex {
        CityIndex::new(i)
    }

    fn five_cities() -> Arc<DistanceMatrix<i64>> {
        Arc::new(DistanceMatrix::from_rows(&[
            vec![0, 3, 4, 2, 7],
            vec![3, 0, 4, 6, 3],
            vec![4, 4, 0, 5, 8],
            vec![2, 6, 5, 0, 6],
            vec![7, 3, 8, 6, 0],
        ]))
    }

    fn engine(seed: u64) -> EvolutionEngine<ChaCha8Rng> {
        EvolutionEngine::new(EvolutionConfig::default(), ChaCha8Rng::seed_from_u64(seed))
    }

    fn base_cycle_cost(matrix: &DistanceMatrix<i64>, order: &[CityIndex]) -> i64 {
        (0..order.len())
            .map(|k| matrix.cost(order[k], order[(k + 1) % order.len()]))
            .sum()
    }

    #[derive(Default)]
    struct RecordingMonitor {
        reports: Vec<GenerationReport>,
        started: bool,
        ended: bool,
        stop_after: Option<u64>,
    }

    impl EvolutionMonitor for RecordingMonitor {
        fn name(&self) -> &str {
            "RecordingMonitor"
        }
        fn on_start(&mut self, _num_cities: usize) {
            self.started = true;
        }
        fn on_generation(&mut self, report: &GenerationReport, _: &EvolutionStatistics) {
            self.reports.push(*report);
        }
        fn on_end(&mut self, _: &Phenotype, _: &EvolutionStatistics) {
            self.ended = true;
        }
        fn search_command(&mut self, statistics: &EvolutionStatistics) -> SearchCommand {
            match self.stop_after {
                Some(limit) if statistics.generations >= limit => {
                    SearchCommand::Terminate("enough".to_string())
                }
                _ => SearchCommand::Continue,
            }
        }
    }

    #[test]
    fn test_all_open_mask_yields_true_cycle_cost() {
        let matrix = five_cities();
        let costs = EdgeCostModel::restricted(Arc::clone(&matrix), &ConnectionMask::new(5));
        let fitness = ClosedTourFitness::new(&costs);

        let outcome = engine(1).run(&fitness, 100, NoOperationMonitor);

        assert!(is_permutation(outcome.best_order()));
        assert_eq!(outcome.best_order().len(), 5);
        assert!(outcome.best_fitness() < INFEASIBLE_FITNESS);
        assert_eq!(
            outcome.best_fitness(),
            base_cycle_cost(&matrix, outcome.best_order()) as f64
        );
        let tour = outcome.tour().expect("feasible tour");
        assert_eq!(tour.objective_value() as f64, outcome.best_fitness());
        assert_eq!(outcome.generations(), 100);
        assert_eq!(
            outcome.termination_reason(),
            &EvolutionTerminationReason::GenerationLimit
        );
    }

    #[test]
    fn test_single_allowed_successor_is_respected() {
        let matrix = five_cities();
        let mut mask = ConnectionMask::new(5);
        for to in 2..5 {
            mask.set_transition(c(0), c(to), false).expect("in range");
        }
        let costs = EdgeCostModel::restricted(Arc::clone(&matrix), &mask);
        let fitness = ClosedTourFitness::new(&costs);

        let outcome = engine(2).run(&fitness, 100, NoOperationMonitor);

        match outcome.tour() {
            Some(tour) => {
                assert_eq!(tour.successor_of(c(0)), Some(c(1)));
                assert_eq!(
                    outcome.best_fitness(),
                    base_cycle_cost(&matrix, outcome.best_order()) as f64
                );
            }
            None => assert_eq!(outcome.best_fitness(), INFEASIBLE_FITNESS),
        }
    }

    #[test]
    fn test_city_without_successor_reports_sentinel() {
        let mut mask = ConnectionMask::new(5);
        for to in 1..5 {
            mask.set_transition(c(0), c(to), false).expect("in range");
        }
        let costs = EdgeCostModel::restricted(five_cities(), &mask);
        let fitness = ClosedTourFitness::new(&costs);

        let outcome = engine(3).run(&fitness, 20, NoOperationMonitor);
        assert_eq!(outcome.best_fitness(), INFEASIBLE_FITNESS);
        assert!(outcome.tour().is_none());
        assert!(is_permutation(outcome.best_order()));
        assert_eq!(
            outcome.statistics().infeasible_evaluations,
            outcome.statistics().evaluations
        );
    }

    #[test]
    fn test_run_best_never_gets_worse() {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let costs_flat = (0..144)
            .map(|k| if k / 12 == k % 12 { 0 } else { rng.random_range(1..50) })
            .collect();
        let costs = EdgeCostModel::new(Arc::new(DistanceMatrix::from_flat(12, costs_flat)));
        let fitness = ClosedTourFitness::new(&costs);

        let mut monitor = RecordingMonitor::default();
        let outcome = engine(4).run(&fitness, 200, &mut monitor);

        assert!(monitor.started && monitor.ended);
        assert_eq!(monitor.reports.len(), 200);
        assert!(
            monitor
                .reports
                .windows(2)
                .all(|w| w[1].run_best_fitness <= w[0].run_best_fitness)
        );
        assert!(
            monitor
                .reports
                .iter()
                .all(|r| r.best_fitness >= r.run_best_fitness)
        );
        let last = monitor.reports.last().expect("reports");
        assert_eq!(outcome.best_fitness(), last.run_best_fitness);
        assert_eq!(monitor.reports[0].generation, 1);
        assert_eq!(last.generation, 200);
    }

    #[test]
    fn test_monitor_can_abort() {
        let costs = EdgeCostModel::new(five_cities());
        let fitness = ClosedTourFitness::new(&costs);
        let mut monitor = RecordingMonitor {
            stop_after: Some(3),
            ..Default::default()
        };

        let outcome = engine(5).run(&fitness, 1_000, &mut monitor);
        assert_eq!(outcome.generations(), 3);
        assert_eq!(
            outcome.termination_reason(),
            &EvolutionTerminationReason::Aborted("enough".to_string())
        );
        assert!(monitor.ended);
    }

    #[test]
    fn test_zero_generations_returns_initial_best() {
        let costs = EdgeCostModel::new(five_cities());
        let fitness = ClosedTourFitness::new(&costs);
        let outcome = engine(6).run(&fitness, 0, NoOperationMonitor);

        assert_eq!(outcome.generations(), 0);
        assert_eq!(outcome.statistics().evaluations, 50);
        assert!(outcome.tour().is_some());
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let costs = EdgeCostModel::new(five_cities());
        let fitness = ClosedTourFitness::new(&costs);
        let a = engine(7).run(&fitness, 50, NoOperationMonitor);
        let b = engine(7).run(&fitness, 50, NoOperationMonitor);
        assert_eq!(a.best_order(), b.best_order());
        assert_eq!(a.best_fitness(), b.best_fitness());
    }

    #[test]
    fn test_old_individuals_are_replaced() {
        let costs = EdgeCostModel::new(five_cities());
        let fitness = ClosedTourFitness::new(&costs);
        let config = EvolutionConfig::default()
            .with_max_phenotype_age(1)
            .with_mutation_probability(0.0)
            .with_crossover_probability(0.0);
        let mut engine = EvolutionEngine::new(config, ChaCha8Rng::seed_from_u64(8));

        let outcome = engine.run(&fitness, 5, NoOperationMonitor);
        assert!(outcome.statistics().age_replacements > 0);
        assert_eq!(outcome.statistics().crossovers, 0);
        assert_eq!(outcome.statistics().mutations, 0);
        assert!(engine.population().iter().all(|p| p.age(5) <= 1));
    }

    #[test]
    #[should_panic(expected = "called `EvolutionEngine::new` with an invalid config")]
    fn test_invalid_config_panics() {
        let _ = EvolutionEngine::new(
            EvolutionConfig::default().with_tournament_size(0),
            ChaCha8Rng::seed_from_u64(0),
        );
    }
}
