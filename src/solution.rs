//! Solutions as seen from outside the solver, plus result file I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::chromosome::{Chromosome, Route};
use crate::error::{Error, Result};
use crate::individual::Individual;
use crate::problem::{NodeId, ProblemInstance};

/// A complete solution with its score breakdown.
#[derive(Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The list of routes
    pub routes: Vec<Route>,
    /// The total cost of the solution (distance + capacity violation penalties)
    pub fitness: f64,
    /// The total raw distance of the solution
    pub distance: f64,
    /// The total capacity violation across all routes
    pub excess_load: f64,
    /// Is this solution feasible (no capacity violations)
    pub is_feasible: bool,
}

impl Solution {
    /// Snapshot an evaluated individual.
    pub fn from_individual(individual: &Individual) -> Self {
        Solution {
            routes: individual.chromosome.routes.clone(),
            fitness: individual.fitness,
            distance: individual.chromosome.total_distance(),
            excess_load: individual.excess_load,
            is_feasible: individual.is_feasible(),
        }
    }

    /// Every route as depot, customers..., depot.
    pub fn to_node_sequences(&self) -> Vec<Vec<NodeId>> {
        self.routes.iter().map(Route::to_node_sequence).collect()
    }

    /// Get the number of routes.
    pub fn get_route_count(&self) -> usize {
        self.routes.len()
    }

    /// Write the solution in the Cordeau result format:
    ///
    /// ```text
    /// total_distance
    /// depot_number vehicle_number route_distance route_load 0 c1 c2 ... 0
    /// ```
    ///
    /// Depots and vehicles are numbered from 1 in instance order.
    pub fn write<W: Write>(&self, problem: &ProblemInstance, mut out: W) -> Result<()> {
        writeln!(out, "{:.2}", self.distance)?;

        for (depot_number, depot) in problem.get_depots().iter().enumerate() {
            let routes = self
                .routes
                .iter()
                .filter(|r| r.depot == depot.id && !r.is_empty());

            for (vehicle, route) in routes.enumerate() {
                write!(
                    out,
                    "{}\t{}\t{:.2}\t{}\t0",
                    depot_number + 1,
                    vehicle + 1,
                    route.distance,
                    route.load
                )?;
                for customer in &route.customers {
                    write!(out, " {}", customer)?;
                }
                writeln!(out, " 0")?;
            }
        }

        Ok(())
    }

    /// Save the solution to a file in the Cordeau result format.
    pub fn write_to_file<P: AsRef<Path>>(&self, problem: &ProblemInstance, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(problem, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Fitness: {:.2}", self.fitness)?;
        writeln!(f, "  Distance: {:.2}", self.distance)?;
        writeln!(f, "  Excess Load: {:.2}", self.excess_load)?;
        writeln!(f, "  Feasible: {}", self.is_feasible)?;
        writeln!(f, "  Routes: {}", self.routes.len())?;

        for (i, route) in self.routes.iter().enumerate() {
            writeln!(
                f,
                "  Route {} (depot {}): {:?} (Load: {:.2}, Distance: {:.2})",
                i, route.depot, route.customers, route.load, route.distance
            )?;
        }

        Ok(())
    }
}

/// One route line of a result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRoute {
    /// 1-based position of the depot in the instance
    pub depot_number: usize,
    pub vehicle_number: usize,
    pub distance: f64,
    pub load: f64,
    pub customers: Vec<NodeId>,
}

/// A solution read back from a result file, typically a published best known solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSolution {
    pub total_distance: f64,
    pub routes: Vec<ReferenceRoute>,
}

impl ReferenceSolution {
    /// Read a result file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|_| Error::FileNotFound(path.to_path_buf()))?;
        Self::parse(&content)
    }

    /// Parse the format produced by [`Solution::write`].
    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<_>>()))
            .filter(|(_, fields)| !fields.is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| Error::MalformedInstance("empty solution file".to_string()))?;
        let total_distance = parse_number(header[0], 1)?;

        let routes = lines
            .map(|(line_no, fields)| {
                if fields.len() < 4 {
                    return Err(Error::MalformedInstance(format!(
                        "solution line {}: expected at least 4 columns",
                        line_no
                    )));
                }

                let mut stops = fields[4..]
                    .iter()
                    .map(|field| parse_number::<NodeId>(field, line_no))
                    .collect::<Result<Vec<_>>>()?;
                // The route is written enclosed by depot markers.
                if stops.first() == Some(&0) {
                    stops.remove(0);
                }
                if stops.last() == Some(&0) {
                    stops.pop();
                }

                Ok(ReferenceRoute {
                    depot_number: parse_number(fields[0], line_no)?,
                    vehicle_number: parse_number(fields[1], line_no)?,
                    distance: parse_number(fields[2], line_no)?,
                    load: parse_number(fields[3], line_no)?,
                    customers: stops,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ReferenceSolution {
            total_distance,
            routes,
        })
    }

    /// Rebuild a chromosome, resolving depot numbers against the instance.
    pub fn to_chromosome(&self, problem: &ProblemInstance) -> Result<Chromosome> {
        let depots = problem.get_depots();

        let routes = self
            .routes
            .iter()
            .map(|route| {
                let depot = route
                    .depot_number
                    .checked_sub(1)
                    .and_then(|index| depots.get(index))
                    .ok_or_else(|| {
                        Error::MalformedInstance(format!(
                            "solution refers to depot number {}",
                            route.depot_number
                        ))
                    })?;
                Ok(Route::with_customers(depot.id, route.customers.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        // Unused vehicles may be listed as `0 0`.
        let mut chromosome = Chromosome::new(routes);
        chromosome.remove_empty_routes();
        Ok(chromosome)
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, line_no: usize) -> Result<T> {
    field.parse::<T>().map_err(|_| {
        Error::MalformedInstance(format!(
            "solution line {}: cannot parse {:?}",
            line_no, field
        ))
    })
}
