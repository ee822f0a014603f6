//! Individual representation for the genetic algorithm population.

use crate::chromosome::Chromosome;
use crate::error::Result;
use crate::fitness::{Evaluation, FitnessEvaluator};
use std::cmp::Ordering;

/// A chromosome paired with its fitness for the current generation.
#[derive(Debug, Clone)]
pub struct Individual {
    /// The solution represented by this individual
    pub chromosome: Chromosome,
    /// Distance plus capacity penalty; lower is better
    pub fitness: f64,
    /// Total load above capacity over all routes
    pub excess_load: f64,
}

impl Individual {
    /// Evaluate a chromosome and freeze it into an individual.
    pub fn new(mut chromosome: Chromosome, evaluator: &FitnessEvaluator) -> Result<Self> {
        let Evaluation {
            score, excess_load, ..
        } = evaluator.evaluate(&mut chromosome)?;

        Ok(Individual {
            chromosome,
            fitness: score,
            excess_load,
        })
    }

    /// Check if the solution respects every capacity.
    pub fn is_feasible(&self) -> bool {
        self.excess_load <= 1e-10
    }

    /// Check if this individual is a clone of another.
    pub fn is_clone_of(&self, other: &Individual) -> bool {
        self.chromosome.routes.len() == other.chromosome.routes.len()
            && self
                .chromosome
                .routes
                .iter()
                .zip(&other.chromosome.routes)
                .all(|(a, b)| a.depot == b.depot && a.customers == b.customers)
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Individual {}

impl PartialOrd for Individual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Individual {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fitness.total_cmp(&other.fitness)
    }
}
