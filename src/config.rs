//! Configuration parameters for the genetic algorithm.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// How a depot is chosen for each new route while splitting a permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepotAssignment {
    /// Pick a depot uniformly at random.
    Random,
    /// Cycle through the depots in instance order.
    RoundRobin,
    /// Pick the depot closest to the first customer of the route.
    Nearest,
}

impl Default for DepotAssignment {
    fn default() -> Self {
        DepotAssignment::Random
    }
}

/// Configuration settings for the genetic algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of chromosomes in every generation
    pub population_size: usize,
    /// Probability that a chromosome receives one single-swap mutation
    #[serde(alias = "mutation_rate")]
    pub single_swap_mutation_rate: f64,
    /// Probability that a chromosome has one of its routes merged into another
    pub route_removal_mutation_rate: f64,
    /// Probability that a child is produced by crossover instead of copying a parent
    pub crossover_rate: f64,
    /// Number of contenders drawn in each tournament
    pub tournament_size: usize,
    /// Replaces the per-vehicle capacity of every depot when set
    pub capacity_override: Option<f64>,
    /// Fitness surcharge per unit of load above capacity
    pub capacity_penalty: f64,
    /// Depot choice strategy used when routes are rebuilt
    pub depot_assignment: DepotAssignment,
    /// Seed for the random source; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population_size: 50,
            single_swap_mutation_rate: 0.05,
            route_removal_mutation_rate: 0.05,
            crossover_rate: 1.0,
            tournament_size: 5,
            capacity_override: None,
            capacity_penalty: 1000.0,
            depot_assignment: DepotAssignment::Random,
            seed: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|_| Error::FileNotFound(path.to_path_buf()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value lies in its documented range.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig(
                "population_size must be positive".to_string(),
            ));
        }
        for (name, rate) in [
            ("single_swap_mutation_rate", self.single_swap_mutation_rate),
            ("route_removal_mutation_rate", self.route_removal_mutation_rate),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::InvalidConfig(format!(
                    "{} must lie in [0, 1], got {}",
                    name, rate
                )));
            }
        }
        if self.tournament_size < 2 {
            return Err(Error::InvalidConfig(format!(
                "tournament_size must be at least 2, got {}",
                self.tournament_size
            )));
        }
        if let Some(capacity) = self.capacity_override {
            if !(capacity > 0.0) || !capacity.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "capacity_override must be positive, got {}",
                    capacity
                )));
            }
        }
        if !(self.capacity_penalty > 0.0) || !self.capacity_penalty.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "capacity_penalty must be positive, got {}",
                self.capacity_penalty
            )));
        }
        Ok(())
    }

    /// Set the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the single-swap mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.single_swap_mutation_rate = rate;
        self
    }

    /// Set the route-removal mutation rate.
    pub fn with_route_removal_rate(mut self, rate: f64) -> Self {
        self.route_removal_mutation_rate = rate;
        self
    }

    /// Set the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Set the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Override the vehicle capacity of every depot.
    pub fn with_capacity_override(mut self, capacity: f64) -> Self {
        self.capacity_override = Some(capacity);
        self
    }

    /// Set the penalty weight for excess load.
    pub fn with_capacity_penalty(mut self, penalty: f64) -> Self {
        self.capacity_penalty = penalty;
        self
    }

    /// Set the depot assignment strategy.
    pub fn with_depot_assignment(mut self, strategy: DepotAssignment) -> Self {
        self.depot_assignment = strategy;
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
