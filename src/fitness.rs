//! Fitness evaluation: total travelled distance plus a capacity penalty.

use crate::chromosome::Chromosome;
use crate::config::Config;
use crate::distance::DistanceCache;
use crate::error::Result;
use crate::problem::{NodeId, ProblemInstance};

/// Score components of one chromosome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Sum of route distances
    pub distance: f64,
    /// Sum over routes of the load above capacity
    pub excess_load: f64,
    /// `distance + penalty_weight * excess_load`, lower is better
    pub score: f64,
}

impl Evaluation {
    pub fn is_feasible(&self) -> bool {
        self.excess_load <= 1e-10
    }
}

/// Scores chromosomes against one instance.
///
/// Also answers capacity queries for the split, so that routes are built
/// and judged against the same (possibly overridden) capacity.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator<'a> {
    problem: &'a ProblemInstance,
    distances: &'a DistanceCache,
    capacity_override: Option<f64>,
    penalty_weight: f64,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(problem: &'a ProblemInstance, distances: &'a DistanceCache, config: &Config) -> Self {
        Self::with_parameters(
            problem,
            distances,
            config.capacity_override,
            config.capacity_penalty,
        )
    }

    pub fn with_parameters(
        problem: &'a ProblemInstance,
        distances: &'a DistanceCache,
        capacity_override: Option<f64>,
        penalty_weight: f64,
    ) -> Self {
        FitnessEvaluator {
            problem,
            distances,
            capacity_override,
            penalty_weight,
        }
    }

    pub fn problem(&self) -> &'a ProblemInstance {
        self.problem
    }

    pub fn distances(&self) -> &'a DistanceCache {
        self.distances
    }

    pub fn penalty_weight(&self) -> f64 {
        self.penalty_weight
    }

    /// Per-vehicle capacity of a depot, after any override.
    pub fn capacity(&self, depot: NodeId) -> Result<f64> {
        match self.capacity_override {
            Some(capacity) => Ok(capacity),
            None => self.problem.node(depot).map(|node| node.capacity()),
        }
    }

    /// Refresh modified routes and compute the full score breakdown.
    pub fn evaluate(&self, chromosome: &mut Chromosome) -> Result<Evaluation> {
        chromosome.evaluate(self.problem, self.distances)?;

        let mut distance = 0.0;
        let mut excess_load = 0.0;
        for route in &chromosome.routes {
            distance += route.distance;
            excess_load += route.get_excess_load(self.capacity(route.depot)?);
        }

        Ok(Evaluation {
            distance,
            excess_load,
            score: distance + self.penalty_weight * excess_load,
        })
    }

    /// Refresh modified routes and return the scalar fitness.
    pub fn fitness(&self, chromosome: &mut Chromosome) -> Result<f64> {
        self.evaluate(chromosome).map(|evaluation| evaluation.score)
    }
}
