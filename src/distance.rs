//! Precomputed Euclidean distances between every pair of nodes.

use itertools::Itertools;
use std::collections::HashMap;
use std::iter;

use crate::error::{Error, Result};
use crate::problem::{NodeId, ProblemInstance};

/// Dense, symmetric distance table over all customers and depots.
///
/// Built once per instance and read-only afterwards, so it can be shared
/// between independent solvers.
#[derive(Debug, Clone)]
pub struct DistanceCache {
    size: usize,
    index: HashMap<NodeId, usize>,
    distances: Vec<f64>,
}

impl DistanceCache {
    /// Build the full distance table for an instance.
    pub fn new(problem: &ProblemInstance) -> Self {
        let nodes = problem.nodes();
        let size = nodes.len();
        let mut distances = vec![0.0; size * size];

        for i in 0..size {
            for j in (i + 1)..size {
                let d = nodes[i].distance(&nodes[j]);
                distances[i * size + j] = d;
                distances[j * size + i] = d;
            }
        }

        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id, i))
            .collect();

        DistanceCache {
            size,
            index,
            distances,
        }
    }

    /// Distance between two nodes.
    pub fn distance(&self, from: NodeId, to: NodeId) -> Result<f64> {
        let i = self.slot(from)?;
        let j = self.slot(to)?;
        Ok(self.distances[i * self.size + j])
    }

    /// Length of the closed tour depot -> customers... -> depot.
    pub fn route_length(&self, depot: NodeId, customers: &[NodeId]) -> Result<f64> {
        iter::once(depot)
            .chain(customers.iter().copied())
            .chain(iter::once(depot))
            .tuple_windows()
            .map(|(from, to)| self.distance(from, to))
            .sum()
    }

    /// Number of nodes covered by the table.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn slot(&self, id: NodeId) -> Result<usize> {
        self.index.get(&id).copied().ok_or(Error::UnknownNode(id))
    }
}
