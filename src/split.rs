//! Split a customer permutation into capacity-respecting routes.

use log::trace;
use rand::Rng;

use crate::chromosome::{Chromosome, Route};
use crate::config::DepotAssignment;
use crate::error::Result;
use crate::fitness::FitnessEvaluator;
use crate::problem::NodeId;

/// Greedy partition of a permutation into contiguous runs, one route each.
///
/// A run is closed as soon as the next customer would push its load above
/// the depot capacity. A customer whose demand alone exceeds the capacity
/// gets a route of its own; the violation is left to the fitness penalty.
pub struct Split;

impl Split {
    /// Partition `permutation` into routes and evaluate them.
    pub fn split<R: Rng>(
        permutation: &[NodeId],
        evaluator: &FitnessEvaluator,
        strategy: DepotAssignment,
        rng: &mut R,
    ) -> Result<Chromosome> {
        let problem = evaluator.problem();
        let mut chooser = DepotChooser::new(*evaluator, strategy);
        let mut routes = Vec::new();

        let mut current: Option<Route> = None;
        let mut load = 0.0;
        let mut capacity = 0.0;

        for &customer in permutation {
            let demand = problem.demand(customer)?;

            if let Some(route) = current.as_mut() {
                if load + demand <= capacity {
                    route.customers.push(customer);
                    load += demand;
                    continue;
                }
            }

            if let Some(route) = current.take() {
                routes.push(route);
            }

            let depot = chooser.choose(customer, rng)?;
            capacity = evaluator.capacity(depot)?;
            if demand > capacity {
                trace!(
                    "customer {} (demand {}) exceeds capacity {} of depot {}",
                    customer,
                    demand,
                    capacity,
                    depot
                );
            }
            current = Some(Route::with_customers(depot, vec![customer]));
            load = demand;
        }

        routes.extend(current);

        let mut chromosome = Chromosome::new(routes);
        chromosome.evaluate(problem, evaluator.distances())?;
        Ok(chromosome)
    }
}

/// Picks the depot for each new route and counts vehicles per depot.
struct DepotChooser<'a> {
    evaluator: FitnessEvaluator<'a>,
    strategy: DepotAssignment,
    vehicles_used: Vec<usize>,
    cursor: usize,
}

impl<'a> DepotChooser<'a> {
    fn new(evaluator: FitnessEvaluator<'a>, strategy: DepotAssignment) -> Self {
        DepotChooser {
            evaluator,
            strategy,
            vehicles_used: vec![0; evaluator.problem().depot_count()],
            cursor: 0,
        }
    }

    fn choose<R: Rng>(&mut self, first_customer: NodeId, rng: &mut R) -> Result<NodeId> {
        let problem = self.evaluator.problem();
        let depots = problem.get_depots();

        // Depots that still have a vehicle left; every depot once all are exhausted.
        let mut candidates: Vec<usize> = match problem.max_vehicles() {
            Some(limit) => (0..depots.len())
                .filter(|&d| self.vehicles_used[d] < limit)
                .collect(),
            None => (0..depots.len()).collect(),
        };
        if candidates.is_empty() {
            candidates = (0..depots.len()).collect();
        }

        let chosen = match self.strategy {
            DepotAssignment::Random => candidates[rng.gen_range(0..candidates.len())],
            DepotAssignment::RoundRobin => {
                let pick = (0..depots.len())
                    .map(|offset| (self.cursor + offset) % depots.len())
                    .find(|d| candidates.contains(d))
                    .unwrap_or(candidates[0]);
                self.cursor = (pick + 1) % depots.len();
                pick
            }
            DepotAssignment::Nearest => {
                let distances = self.evaluator.distances();
                let mut best = candidates[0];
                let mut best_distance = f64::INFINITY;
                for &d in &candidates {
                    let distance = distances.distance(first_customer, depots[d].id)?;
                    if distance < best_distance {
                        best = d;
                        best_distance = distance;
                    }
                }
                best
            }
        };

        self.vehicles_used[chosen] += 1;
        Ok(depots[chosen].id)
    }
}
