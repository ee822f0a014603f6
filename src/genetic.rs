//! Genetic operators: ordered crossover and the two mutations.

use log::trace;
use rand::Rng;
use std::collections::HashSet;

use crate::chromosome::Chromosome;
use crate::problem::NodeId;

/// Implements the crossover and mutation operators.
pub struct Genetic;

impl Genetic {
    /// Perform ordered crossover (OX) on the customer sequences of two parents.
    ///
    /// A random segment of the first parent is kept in place; the remaining
    /// positions are filled with the second parent's customers in their
    /// relative order, starting after the segment and wrapping around. The
    /// result is a permutation that still has to be split into routes.
    pub fn crossover<R: Rng>(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut R,
    ) -> Vec<NodeId> {
        let p1_tour = parent1.customer_sequence();
        let p2_tour = parent2.customer_sequence();

        if p1_tour.is_empty() || p2_tour.is_empty() {
            return p1_tour;
        }

        // Determine cutting points for OX
        let tour_size = p1_tour.len();
        let cut1 = rng.gen_range(0..tour_size);
        let cut2 = rng.gen_range(0..tour_size);

        let (start, end) = if cut1 <= cut2 {
            (cut1, cut2)
        } else {
            (cut2, cut1)
        };

        let mut offspring_tour = vec![0; tour_size];
        let mut used = HashSet::with_capacity(tour_size);
        for i in start..=end {
            offspring_tour[i] = p1_tour[i];
            used.insert(p1_tour[i]);
        }

        // Fill remaining positions from the second parent
        let mut j = (end + 1) % tour_size;
        for offset in 0..p2_tour.len() {
            let customer = p2_tour[(end + 1 + offset) % p2_tour.len()];
            if used.insert(customer) {
                offspring_tour[j] = customer;
                j = (j + 1) % tour_size;
            }
        }

        trace!("ox crossover kept segment {}..={}", start, end);
        offspring_tour
    }

    /// With probability `rate`, swap two distinct customers anywhere in the chromosome.
    ///
    /// Only the routes holding the two customers are marked for re-evaluation.
    /// Returns whether a swap happened.
    pub fn swap_mutation<R: Rng>(&self, chromosome: &mut Chromosome, rate: f64, rng: &mut R) -> bool {
        if rng.gen::<f64>() >= rate {
            return false;
        }

        let size = chromosome.customer_count();
        if size < 2 {
            return false;
        }

        let a = rng.gen_range(0..size);
        let mut b = rng.gen_range(0..size - 1);
        if b >= a {
            b += 1;
        }

        chromosome.swap_positions(a, b)
    }

    /// With probability `rate`, empty one route into another and drop it.
    ///
    /// The customers of a random route are appended to a different random
    /// route, reducing the vehicle count by one. Returns whether a route was removed.
    pub fn route_removal_mutation<R: Rng>(
        &self,
        chromosome: &mut Chromosome,
        rate: f64,
        rng: &mut R,
    ) -> bool {
        if rng.gen::<f64>() >= rate {
            return false;
        }

        let count = chromosome.routes.len();
        if count < 2 {
            return false;
        }

        let victim = rng.gen_range(0..count);
        let mut target = rng.gen_range(0..count - 1);
        if target >= victim {
            target += 1;
        }

        let moved = std::mem::take(&mut chromosome.routes[victim].customers);
        let receiver = &mut chromosome.routes[target];
        receiver.customers.extend(moved);
        receiver.modified = true;
        chromosome.routes.remove(victim);

        true
    }
}
