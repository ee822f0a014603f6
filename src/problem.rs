//! Problem definition and data structures for the multi-depot VRP.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Identifier of a customer or depot. Unique across the whole instance.
pub type NodeId = usize;

/// What a node is, together with the quantity that only that kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A customer with its demand.
    Customer { demand: f64 },
    /// A depot with the capacity of each vehicle it dispatches.
    Depot { capacity: f64 },
}

/// Represents a node (customer or depot) in the problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub kind: NodeKind,
}

impl Node {
    /// Create a customer node.
    pub fn customer(id: NodeId, x: f64, y: f64, demand: f64) -> Self {
        Node {
            id,
            x,
            y,
            kind: NodeKind::Customer { demand },
        }
    }

    /// Create a depot node.
    pub fn depot(id: NodeId, x: f64, y: f64, capacity: f64) -> Self {
        Node {
            id,
            x,
            y,
            kind: NodeKind::Depot { capacity },
        }
    }

    /// Calculate the Euclidean distance between two nodes.
    pub fn distance(&self, other: &Node) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_depot(&self) -> bool {
        matches!(self.kind, NodeKind::Depot { .. })
    }

    /// Demand of a customer, zero for a depot.
    pub fn demand(&self) -> f64 {
        match self.kind {
            NodeKind::Customer { demand } => demand,
            NodeKind::Depot { .. } => 0.0,
        }
    }

    /// Vehicle capacity of a depot, zero for a customer.
    pub fn capacity(&self) -> f64 {
        match self.kind {
            NodeKind::Depot { capacity } => capacity,
            NodeKind::Customer { .. } => 0.0,
        }
    }
}

/// Axis-aligned box enclosing every node of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundaries {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Boundaries {
    fn enclosing<'a, I: IntoIterator<Item = &'a Node>>(nodes: I) -> Self {
        let mut bounds = Boundaries {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };

        for node in nodes {
            bounds.min_x = bounds.min_x.min(node.x);
            bounds.min_y = bounds.min_y.min(node.y);
            bounds.max_x = bounds.max_x.max(node.x);
            bounds.max_y = bounds.max_y.max(node.y);
        }

        bounds
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// An immutable multi-depot VRP instance.
///
/// Nodes are stored customers first, then depots. The bounding box is computed
/// once at construction.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    name: String,
    nodes: Vec<Node>,
    customer_count: usize,
    max_vehicles: Option<usize>,
    boundaries: Boundaries,
    lookup: HashMap<NodeId, usize>,
}

impl ProblemInstance {
    /// Create a new instance, validating every record.
    ///
    /// `max_vehicles` limits the vehicles dispatched from each depot; `None` means unlimited.
    pub fn new(
        name: String,
        customers: Vec<Node>,
        depots: Vec<Node>,
        max_vehicles: Option<usize>,
    ) -> Result<Self> {
        if depots.is_empty() {
            return Err(Error::MalformedInstance(
                "instance has no depot".to_string(),
            ));
        }

        let customer_count = customers.len();
        let mut nodes = customers;
        nodes.extend(depots);

        let mut lookup = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            let expect_depot = index >= customer_count;
            if node.is_depot() != expect_depot {
                return Err(Error::MalformedInstance(format!(
                    "node {} listed as {} but is not one",
                    node.id,
                    if expect_depot { "depot" } else { "customer" }
                )));
            }
            if !node.x.is_finite() || !node.y.is_finite() {
                return Err(Error::MalformedInstance(format!(
                    "node {} has non-finite coordinates",
                    node.id
                )));
            }
            match node.kind {
                NodeKind::Customer { demand } if !(demand >= 0.0) || !demand.is_finite() => {
                    return Err(Error::MalformedInstance(format!(
                        "customer {} has invalid demand {}",
                        node.id, demand
                    )));
                }
                NodeKind::Depot { capacity } if !(capacity > 0.0) || !capacity.is_finite() => {
                    return Err(Error::MalformedInstance(format!(
                        "depot {} has invalid capacity {}",
                        node.id, capacity
                    )));
                }
                _ => {}
            }
            if lookup.insert(node.id, index).is_some() {
                return Err(Error::MalformedInstance(format!(
                    "node id {} is used more than once",
                    node.id
                )));
            }
        }

        let boundaries = Boundaries::enclosing(&nodes);

        Ok(ProblemInstance {
            name,
            nodes,
            customer_count,
            max_vehicles,
            boundaries,
            lookup,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the bounding box of all customers and depots.
    pub fn get_boundaries(&self) -> Boundaries {
        self.boundaries
    }

    /// Get the customer nodes in instance order.
    pub fn get_customers(&self) -> &[Node] {
        &self.nodes[..self.customer_count]
    }

    /// Get the depot nodes in instance order.
    pub fn get_depots(&self) -> &[Node] {
        &self.nodes[self.customer_count..]
    }

    /// All nodes, customers first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.lookup
            .get(&id)
            .map(|&index| &self.nodes[index])
            .ok_or(Error::UnknownNode(id))
    }

    /// Demand of a customer.
    pub fn demand(&self, id: NodeId) -> Result<f64> {
        self.node(id).map(Node::demand)
    }

    /// Ids of every customer in instance order.
    pub fn customer_ids(&self) -> Vec<NodeId> {
        self.get_customers().iter().map(|c| c.id).collect()
    }

    pub fn customer_count(&self) -> usize {
        self.customer_count
    }

    pub fn depot_count(&self) -> usize {
        self.nodes.len() - self.customer_count
    }

    /// Maximum number of vehicles per depot, if limited.
    pub fn max_vehicles(&self) -> Option<usize> {
        self.max_vehicles
    }

    /// Sum of all customer demands.
    pub fn total_demand(&self) -> f64 {
        self.get_customers().iter().map(Node::demand).sum()
    }

    /// Load an instance from a file. JSON is recognised by its `.json` extension,
    /// anything else is read as the Cordeau MDVRP text format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|_| Error::FileNotFound(path.to_path_buf()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        if path.extension().map_or(false, |ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_cordeau(name, &content)
        }
    }

    /// Parse the Cordeau MDVRP format.
    ///
    /// ```text
    /// m n t                 max vehicles per depot, customers, depots
    /// D Q                   t lines: max route duration (ignored), vehicle capacity
    /// i x y d q ...         n lines: customer id, position, service duration (ignored), demand
    /// j x y ...             t lines: depot id, position
    /// ```
    pub fn from_cordeau(name: String, content: &str) -> Result<Self> {
        let lines: Vec<(usize, Vec<&str>)> = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<_>>()))
            .filter(|(_, fields)| !fields.is_empty())
            .collect();

        let (line_no, header) = lines
            .first()
            .ok_or_else(|| Error::MalformedInstance("empty problem file".to_string()))?;
        let max_vehicles: usize = parse_field(header, 0, *line_no)?;
        let num_customers: usize = parse_field(header, 1, *line_no)?;
        let num_depots: usize = parse_field(header, 2, *line_no)?;

        let expected = 1 + 2 * num_depots + num_customers;
        if lines.len() < expected {
            return Err(Error::MalformedInstance(format!(
                "expected {} records, found {}",
                expected,
                lines.len()
            )));
        }

        let depot_info = &lines[1..1 + num_depots];
        let customer_lines = &lines[1 + num_depots..1 + num_depots + num_customers];
        let depot_lines = &lines[1 + num_depots + num_customers..expected];

        let customers = customer_lines
            .iter()
            .map(|(line_no, fields)| {
                Ok(Node::customer(
                    parse_field(fields, 0, *line_no)?,
                    parse_field(fields, 1, *line_no)?,
                    parse_field(fields, 2, *line_no)?,
                    parse_field(fields, 4, *line_no)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let depots = depot_info
            .iter()
            .zip(depot_lines)
            .map(|((info_no, info), (line_no, fields))| {
                Ok(Node::depot(
                    parse_field(fields, 0, *line_no)?,
                    parse_field(fields, 1, *line_no)?,
                    parse_field(fields, 2, *line_no)?,
                    parse_field(info, 1, *info_no)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let max_vehicles = if max_vehicles == 0 {
            None
        } else {
            Some(max_vehicles)
        };

        Self::new(name, customers, depots, max_vehicles)
    }

    /// Parse an instance given as JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawInstance = serde_json::from_str(content)
            .map_err(|e| Error::MalformedInstance(e.to_string()))?;

        let customers = raw
            .customers
            .into_iter()
            .map(|record| {
                let (x, y) = record.position("customer")?;
                let demand = record.demand.ok_or_else(|| {
                    Error::MalformedInstance(format!("customer {} has no demand", record.id))
                })?;
                Ok(Node::customer(record.id, x, y, demand))
            })
            .collect::<Result<Vec<_>>>()?;

        let depots = raw
            .depots
            .into_iter()
            .map(|record| {
                let (x, y) = record.position("depot")?;
                let capacity = record.capacity.ok_or_else(|| {
                    Error::MalformedInstance(format!("depot {} has no capacity", record.id))
                })?;
                Ok(Node::depot(record.id, x, y, capacity))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(raw.name, customers, depots, raw.max_vehicles)
    }
}

/// Instance layout accepted by [`ProblemInstance::from_json`].
#[derive(Debug, Deserialize)]
struct RawInstance {
    #[serde(default)]
    name: String,
    #[serde(default)]
    max_vehicles: Option<usize>,
    #[serde(default)]
    customers: Vec<RawNode>,
    #[serde(default)]
    depots: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: NodeId,
    x: Option<f64>,
    y: Option<f64>,
    demand: Option<f64>,
    capacity: Option<f64>,
}

impl RawNode {
    fn position(&self, kind: &str) -> Result<(f64, f64)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(Error::MalformedInstance(format!(
                "{} {} is missing coordinates",
                kind, self.id
            ))),
        }
    }
}

fn parse_field<T: FromStr>(fields: &[&str], column: usize, line_no: usize) -> Result<T> {
    let raw = fields.get(column).ok_or_else(|| {
        Error::MalformedInstance(format!("line {}: missing column {}", line_no, column + 1))
    })?;
    raw.parse::<T>().map_err(|_| {
        Error::MalformedInstance(format!(
            "line {}: cannot parse column {} ({:?})",
            line_no,
            column + 1,
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_reports_line_and_column() {
        let fields = ["7", "x"];

        assert_eq!(parse_field::<usize>(&fields, 0, 3).unwrap(), 7);

        match parse_field::<f64>(&fields, 1, 3) {
            Err(Error::MalformedInstance(message)) => assert!(message.contains("line 3")),
            other => panic!("unexpected {:?}", other),
        }
        match parse_field::<f64>(&fields, 4, 9) {
            Err(Error::MalformedInstance(message)) => assert!(message.contains("column 5")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
