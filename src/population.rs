//! Population management for the genetic algorithm.

use log::{debug, trace};
use rand::{seq::SliceRandom, Rng};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fitness::FitnessEvaluator;
use crate::genetic::Genetic;
use crate::individual::Individual;
use crate::split::Split;

/// One generation of individuals plus the best individual ever seen.
///
/// `individuals` is kept sorted by ascending fitness, so the generation's
/// best sits at index 0.
pub struct Population {
    /// Individuals of the current generation, best first
    pub individuals: Vec<Individual>,
    /// Best individual observed over all generations
    best: Option<Individual>,
    /// Number of completed generational replacements
    pub generation: usize,
    genetic: Genetic,
}

impl Population {
    /// Create an empty population.
    pub fn new(config: &Config) -> Self {
        Population {
            individuals: Vec::with_capacity(config.population_size),
            best: None,
            generation: 0,
            genetic: Genetic,
        }
    }

    /// Seed the population with random chromosomes.
    ///
    /// Each chromosome is a shuffled customer sequence split into
    /// capacity-respecting routes.
    pub fn initialize<R: Rng>(
        &mut self,
        config: &Config,
        evaluator: &FitnessEvaluator,
        rng: &mut R,
    ) -> Result<()> {
        self.individuals.clear();
        self.best = None;
        self.generation = 0;

        let customers = evaluator.problem().customer_ids();

        for _ in 0..config.population_size {
            let mut permutation = customers.clone();
            permutation.shuffle(rng);

            let chromosome = Split::split(&permutation, evaluator, config.depot_assignment, rng)?;
            self.individuals.push(Individual::new(chromosome, evaluator)?);
        }

        self.individuals.sort();
        self.update_best();
        Ok(())
    }

    /// Replace the generation: the current best survives unchanged, every other
    /// slot is filled through selection, crossover and mutation.
    pub fn evolve<R: Rng>(
        &mut self,
        config: &Config,
        evaluator: &FitnessEvaluator,
        rng: &mut R,
    ) -> Result<()> {
        let elite = self
            .generation_best()
            .cloned()
            .ok_or(Error::NotInitialized("population is empty"))?;

        let mut next = Vec::with_capacity(config.population_size);
        next.push(elite);

        while next.len() < config.population_size {
            let parent1 = self.tournament_selection(config.tournament_size, rng)?;
            let parent2 = self.tournament_selection(config.tournament_size, rng)?;

            let mut child = if rng.gen::<f64>() < config.crossover_rate {
                let tour = self
                    .genetic
                    .crossover(&parent1.chromosome, &parent2.chromosome, rng);
                Split::split(&tour, evaluator, config.depot_assignment, rng)?
            } else {
                parent1.chromosome.clone()
            };

            if self
                .genetic
                .route_removal_mutation(&mut child, config.route_removal_mutation_rate, rng)
            {
                trace!("route removal mutation applied");
            }
            if self
                .genetic
                .swap_mutation(&mut child, config.single_swap_mutation_rate, rng)
            {
                trace!("single swap mutation applied");
            }

            next.push(Individual::new(child, evaluator)?);
        }

        next.sort();
        self.individuals = next;
        self.generation += 1;
        self.update_best();

        debug!(
            "generation {}: best {:.2}, mean {:.2}",
            self.generation,
            self.individuals[0].fitness,
            self.mean_fitness()
        );
        Ok(())
    }

    /// Draw `k` individuals uniformly at random (with replacement) and return
    /// the fittest. Ties keep the earliest draw.
    pub fn tournament_selection<R: Rng>(&self, k: usize, rng: &mut R) -> Result<&Individual> {
        if self.individuals.is_empty() {
            return Err(Error::NotInitialized("population is empty"));
        }

        let n = self.individuals.len();
        let mut best = &self.individuals[rng.gen_range(0..n)];
        for _ in 1..k {
            let contender = &self.individuals[rng.gen_range(0..n)];
            if contender.fitness < best.fitness {
                best = contender;
            }
        }
        Ok(best)
    }

    /// Best individual ever observed.
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Best individual of the current generation.
    pub fn generation_best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Average fitness of the current generation.
    pub fn mean_fitness(&self) -> f64 {
        if self.individuals.is_empty() {
            return f64::NAN;
        }
        self.individuals.iter().map(|i| i.fitness).sum::<f64>() / self.individuals.len() as f64
    }

    /// Get the population size.
    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    /// Number of individuals without capacity violations.
    pub fn feasible_count(&self) -> usize {
        self.individuals.iter().filter(|i| i.is_feasible()).count()
    }

    fn update_best(&mut self) {
        let Some(candidate) = self.generation_best() else {
            return;
        };

        let improved = match &self.best {
            Some(best) => candidate.fitness < best.fitness,
            None => true,
        };

        if improved {
            self.best = Some(candidate.clone());
        }
    }
}
