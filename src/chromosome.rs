//! Chromosome representation: an ordered set of depot-anchored routes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::distance::DistanceCache;
use crate::error::Result;
use crate::problem::{NodeId, ProblemInstance};

/// One vehicle's tour: depot, customers in visiting order, back to the same depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// The depot the vehicle leaves from and returns to
    pub depot: NodeId,
    /// The sequence of customer ids (excluding the depot)
    pub customers: Vec<NodeId>,
    /// The total demand served by the route
    pub load: f64,
    /// The total distance of the route
    pub distance: f64,
    /// Has this route been modified since last evaluation
    pub modified: bool,
}

impl Route {
    /// Create a new, empty route from a depot.
    pub fn new(depot: NodeId) -> Self {
        Route {
            depot,
            customers: Vec::new(),
            load: 0.0,
            distance: 0.0,
            modified: true,
        }
    }

    /// Create a route visiting the given customers in order.
    pub fn with_customers(depot: NodeId, customers: Vec<NodeId>) -> Self {
        Route {
            customers,
            ..Route::new(depot)
        }
    }

    /// Recalculate load and distance if the route changed since the last call.
    pub fn evaluate(&mut self, problem: &ProblemInstance, distances: &DistanceCache) -> Result<()> {
        if !self.modified {
            return Ok(());
        }

        self.distance = distances.route_length(self.depot, &self.customers)?;

        let mut total_load = 0.0;
        for &customer in &self.customers {
            total_load += problem.demand(customer)?;
        }
        self.load = total_load;

        self.modified = false;
        Ok(())
    }

    /// Check if the route is empty.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Check if the route exceeds the vehicle capacity.
    pub fn exceeds_capacity(&self, capacity: f64) -> bool {
        self.load > capacity
    }

    /// Get the load excess beyond the vehicle capacity.
    pub fn get_excess_load(&self, capacity: f64) -> f64 {
        (self.load - capacity).max(0.0)
    }

    /// Node sequence as driven: depot, customers..., depot.
    pub fn to_node_sequence(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.customers.len() + 2);
        nodes.push(self.depot);
        nodes.extend(&self.customers);
        nodes.push(self.depot);
        nodes
    }
}

/// A candidate solution: every customer appears in exactly one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    pub routes: Vec<Route>,
}

impl Chromosome {
    pub fn new(routes: Vec<Route>) -> Self {
        Chromosome { routes }
    }

    /// Total number of customers over all routes.
    pub fn customer_count(&self) -> usize {
        self.routes.iter().map(|r| r.customers.len()).sum()
    }

    /// The customers of every route concatenated, without route delimiters.
    pub fn customer_sequence(&self) -> Vec<NodeId> {
        self.routes
            .iter()
            .flat_map(|r| r.customers.iter().copied())
            .collect()
    }

    /// Map a position in [`Chromosome::customer_sequence`] to (route, index within route).
    pub fn locate(&self, position: usize) -> Option<(usize, usize)> {
        let mut offset = position;
        for (route_index, route) in self.routes.iter().enumerate() {
            if offset < route.customers.len() {
                return Some((route_index, offset));
            }
            offset -= route.customers.len();
        }
        None
    }

    /// Swap the customers at two flat positions. Only the touched routes are
    /// marked for re-evaluation.
    pub fn swap_positions(&mut self, a: usize, b: usize) -> bool {
        let (Some((ra, ia)), Some((rb, ib))) = (self.locate(a), self.locate(b)) else {
            return false;
        };

        if ra == rb {
            self.routes[ra].customers.swap(ia, ib);
            self.routes[ra].modified = true;
        } else {
            let customer_a = self.routes[ra].customers[ia];
            let customer_b = self.routes[rb].customers[ib];
            self.routes[ra].customers[ia] = customer_b;
            self.routes[rb].customers[ib] = customer_a;
            self.routes[ra].modified = true;
            self.routes[rb].modified = true;
        }
        true
    }

    /// Re-evaluate the routes marked as modified.
    pub fn evaluate(&mut self, problem: &ProblemInstance, distances: &DistanceCache) -> Result<()> {
        for route in &mut self.routes {
            route.evaluate(problem, distances)?;
        }
        Ok(())
    }

    /// Sum of route distances (valid after [`Chromosome::evaluate`]).
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.distance).sum()
    }

    /// Drop routes without customers.
    pub fn remove_empty_routes(&mut self) {
        self.routes.retain(|r| !r.is_empty());
    }

    /// Check that the customers form exactly the given set, each once.
    pub fn is_permutation_of(&self, customers: &[NodeId]) -> bool {
        if self.customer_count() != customers.len() {
            return false;
        }
        let expected: HashSet<NodeId> = customers.iter().copied().collect();
        let mut seen = HashSet::with_capacity(customers.len());
        self.routes
            .iter()
            .flat_map(|r| r.customers.iter())
            .all(|c| expected.contains(c) && seen.insert(*c))
    }

    /// Every route as a depot-delimited node sequence.
    pub fn to_node_sequences(&self) -> Vec<Vec<NodeId>> {
        self.routes.iter().map(Route::to_node_sequence).collect()
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chromosome: [")?;
        for route in &self.routes {
            write!(f, " {}:{:?}", route.depot, route.customers)?;
        }
        write!(f, " ]")
    }
}
