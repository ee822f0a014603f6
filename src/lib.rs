//! # MDVRP-GA
//!
//! A genetic algorithm for the Multi-Depot Capacitated Vehicle Routing Problem.
//!
//! Customers are partitioned into depot-anchored routes; the search minimises
//! total travelled distance, with capacity treated as a soft constraint through
//! a linear fitness penalty. Parents are chosen by tournament, recombined with
//! ordered crossover and re-split into capacity-respecting routes, then mutated
//! by single swaps and route removals. The best chromosome of every generation
//! survives unchanged.
//!
//! [`GeneticProgram`] is the entry point: configure it, generate a population,
//! then advance it one generation at a time with [`GeneticProgram::simulate`].

pub mod chromosome;
pub mod config;
pub mod distance;
pub mod error;
pub mod fitness;
pub mod genetic;
pub mod individual;
pub mod population;
pub mod problem;
pub mod solution;
pub mod split;
pub mod utils;

pub use crate::config::{Config, DepotAssignment};
pub use crate::error::{Error, Result};

use crate::distance::DistanceCache;
use crate::fitness::{Evaluation, FitnessEvaluator};
use crate::population::Population;
use crate::problem::{Boundaries, Node, NodeId, ProblemInstance};
use crate::solution::{ReferenceSolution, Solution};

use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use std::sync::Arc;

/// Lifecycle of a [`GeneticProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    /// Constructed, no configuration applied yet.
    Unconfigured,
    /// Configuration applied, no population yet.
    Configured,
    /// Initial population generated.
    Populated,
    /// At least one generation simulated.
    Running,
}

/// The solver state machine.
///
/// Owns its population and random source. The instance and distance table are
/// shared read-only, so several programs can work on the same problem in
/// parallel; a single program must not be driven from two threads at once.
pub struct GeneticProgram {
    problem: Arc<ProblemInstance>,
    distances: Arc<DistanceCache>,
    config: Option<Config>,
    population: Option<Population>,
    rng: ChaCha8Rng,
    state: ProgramState,
}

impl GeneticProgram {
    /// Create a program for an instance, building its distance table.
    pub fn new(problem: ProblemInstance) -> Self {
        let distances = DistanceCache::new(&problem);
        Self::with_shared(Arc::new(problem), Arc::new(distances))
    }

    /// Create a program from a problem file (Cordeau text or `.json`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(ProblemInstance::from_file(path)?))
    }

    /// Create a program on an instance and distance table shared with other programs.
    ///
    /// `distances` must have been built from `problem`.
    pub fn with_shared(problem: Arc<ProblemInstance>, distances: Arc<DistanceCache>) -> Self {
        GeneticProgram {
            problem,
            distances,
            config: None,
            population: None,
            rng: ChaCha8Rng::from_entropy(),
            state: ProgramState::Unconfigured,
        }
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    pub fn problem(&self) -> &Arc<ProblemInstance> {
        &self.problem
    }

    pub fn distances(&self) -> &Arc<DistanceCache> {
        &self.distances
    }

    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    /// Number of generations simulated since the population was generated.
    pub fn generation(&self) -> usize {
        self.population.as_ref().map_or(0, |p| p.generation)
    }

    /// Apply a configuration. Any existing population is discarded.
    pub fn update_config(&mut self, config: Config) -> Result<()> {
        config.validate()?;

        self.rng = seeded_rng(config.seed);
        self.config = Some(config);
        self.population = None;
        self.state = ProgramState::Configured;
        Ok(())
    }

    /// Generate a fresh random population, reseeding the random source.
    pub fn generate_population(&mut self) -> Result<()> {
        let config = self
            .config
            .as_ref()
            .ok_or(Error::NotInitialized("generate_population requires a configuration"))?;

        self.rng = seeded_rng(config.seed);
        let evaluator = FitnessEvaluator::new(&self.problem, &self.distances, config);

        for customer in self.problem.get_customers() {
            let demand = customer.demand();
            let fits_somewhere = self
                .problem
                .get_depots()
                .iter()
                .map(|depot| evaluator.capacity(depot.id))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .any(|capacity| demand <= capacity);
            if !fits_somewhere {
                warn!(
                    "customer {} has demand {} above every vehicle capacity",
                    customer.id, demand
                );
            }
        }

        let mut population = Population::new(config);
        population.initialize(config, &evaluator, &mut self.rng)?;

        if let Some(best) = population.best() {
            info!(
                "generated population of {} individuals, best fitness {:.2}",
                population.size(),
                best.fitness
            );
        }

        self.population = Some(population);
        self.state = ProgramState::Populated;
        Ok(())
    }

    /// Advance exactly one generation and return the best route set.
    ///
    /// Each route is a node sequence starting and ending with its depot.
    pub fn simulate(&mut self) -> Result<Vec<Vec<NodeId>>> {
        if !matches!(self.state, ProgramState::Populated | ProgramState::Running) {
            return Err(Error::NotInitialized("simulate requires a generated population"));
        }
        let (Some(config), Some(population)) = (self.config.as_ref(), self.population.as_mut())
        else {
            return Err(Error::NotInitialized("simulate requires a generated population"));
        };

        let evaluator = FitnessEvaluator::new(&self.problem, &self.distances, config);
        let previous = population.best().map(|b| b.fitness);

        population.evolve(config, &evaluator, &mut self.rng)?;
        self.state = ProgramState::Running;

        let best = population
            .best()
            .ok_or(Error::NotInitialized("population is empty"))?;
        if previous.map_or(true, |p| best.fitness < p) {
            info!(
                "generation {}: new best fitness {:.2}",
                population.generation, best.fitness
            );
        }

        Ok(best.chromosome.to_node_sequences())
    }

    /// Fitness of the best chromosome found so far.
    pub fn get_solution_fitness(&self) -> Result<f64> {
        self.best().map(|best| best.fitness)
    }

    /// Best route set found so far, without advancing the search.
    pub fn get_solution(&self) -> Result<Vec<Vec<NodeId>>> {
        self.best().map(|best| best.chromosome.to_node_sequences())
    }

    /// Best solution found so far, with per-route load and distance.
    pub fn best_solution(&self) -> Result<Solution> {
        self.best().map(Solution::from_individual)
    }

    /// Score a reference solution with the current (or default) configuration.
    pub fn evaluate_reference(&self, reference: &ReferenceSolution) -> Result<Evaluation> {
        let config = self.config.clone().unwrap_or_default();
        let evaluator = FitnessEvaluator::new(&self.problem, &self.distances, &config);
        let mut chromosome = reference.to_chromosome(&self.problem)?;
        evaluator.evaluate(&mut chromosome)
    }

    /// Get the bounding box of the instance.
    pub fn get_boundaries(&self) -> Boundaries {
        self.problem.get_boundaries()
    }

    /// Get the customers of the instance.
    pub fn get_customers(&self) -> &[Node] {
        self.problem.get_customers()
    }

    /// Get the depots of the instance.
    pub fn get_depots(&self) -> &[Node] {
        self.problem.get_depots()
    }

    fn best(&self) -> Result<&individual::Individual> {
        self.population
            .as_ref()
            .and_then(Population::best)
            .ok_or(Error::NotInitialized("no population has been generated"))
    }
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}
