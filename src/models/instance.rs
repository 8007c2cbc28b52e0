//! Validated problem instance.

use crate::distance::DistanceMatrix;
use crate::error::CvrpError;

use super::{Node, Vehicle};

/// A CVRP instance: nodes, fleet, and the precomputed distance matrix.
///
/// Construction validates that node 0 is the depot, node ids equal their
/// index, vehicle ids are unique, demands and capacities are nonnegative, and
/// the matrix is a valid square matrix of the right size. Vehicles are kept
/// sorted by ascending id, which is the iteration order of every construction
/// strategy. The instance is read-only for the lifetime of a solve session
/// and is shared between concurrent attempts.
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::models::{Instance, Node, Vehicle};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::new(1, 3, 0.0, 1.0),
///     Node::new(2, 4, 1.0, 0.0),
/// ];
/// let dm = DistanceMatrix::from_nodes(&nodes);
/// let vehicles = vec![Vehicle::new(2, 10), Vehicle::new(1, 5)];
///
/// let instance = Instance::new(nodes, vehicles, dm).unwrap();
/// assert_eq!(instance.num_clients(), 2);
/// assert_eq!(instance.vehicles()[0].id(), 1);
/// assert_eq!(instance.total_demand(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    nodes: Vec<Node>,
    vehicles: Vec<Vehicle>,
    distances: DistanceMatrix,
}

impl Instance {
    /// Builds and validates an instance.
    pub fn new(
        nodes: Vec<Node>,
        mut vehicles: Vec<Vehicle>,
        distances: DistanceMatrix,
    ) -> Result<Self, CvrpError> {
        match nodes.first() {
            Some(depot) if depot.is_depot() => {}
            _ => {
                return Err(CvrpError::InvalidInstance(
                    "node 0 must be the depot".into(),
                ))
            }
        }
        for (idx, node) in nodes.iter().enumerate() {
            if node.id() != idx {
                return Err(CvrpError::InvalidInstance(format!(
                    "node at index {idx} has id {}",
                    node.id()
                )));
            }
            if node.demand() < 0 {
                return Err(CvrpError::InvalidInstance(format!(
                    "node {idx} has negative demand {}",
                    node.demand()
                )));
            }
        }
        if nodes[0].demand() != 0 {
            return Err(CvrpError::InvalidInstance(
                "depot demand must be zero".into(),
            ));
        }

        if vehicles.is_empty() {
            return Err(CvrpError::InvalidInstance("fleet is empty".into()));
        }
        vehicles.sort_by_key(|v| v.id());
        if let Some(w) = vehicles.windows(2).find(|w| w[0].id() == w[1].id()) {
            return Err(CvrpError::InvalidInstance(format!(
                "duplicate vehicle id {}",
                w[0].id()
            )));
        }
        if let Some(v) = vehicles.iter().find(|v| v.capacity() < 0) {
            return Err(CvrpError::InvalidInstance(format!(
                "vehicle {} has negative capacity {}",
                v.id(),
                v.capacity()
            )));
        }

        if distances.size() != nodes.len() {
            return Err(CvrpError::InvalidMatrix(format!(
                "matrix size {} does not match {} nodes",
                distances.size(),
                nodes.len()
            )));
        }
        distances.validate()?;

        Ok(Self {
            nodes,
            vehicles,
            distances,
        })
    }

    /// All nodes (index 0 = depot).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node by id.
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Client ids in ascending order (depot excluded).
    pub fn client_ids(&self) -> impl Iterator<Item = usize> + '_ {
        1..self.nodes.len()
    }

    /// Number of clients (depot excluded).
    pub fn num_clients(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Demand of a node; zero for unknown ids.
    pub fn demand(&self, id: usize) -> i32 {
        self.nodes.get(id).map_or(0, Node::demand)
    }

    /// Fleet sorted by ascending id.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Vehicle by id.
    pub fn vehicle(&self, id: usize) -> Option<&Vehicle> {
        self.vehicles
            .binary_search_by_key(&id, |v| v.id())
            .ok()
            .map(|idx| &self.vehicles[idx])
    }

    /// The read-only distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Sum of all client demands.
    pub fn total_demand(&self) -> i32 {
        self.nodes.iter().map(Node::demand).sum()
    }

    /// Largest vehicle capacity.
    pub fn max_capacity(&self) -> i32 {
        self.vehicles.iter().map(Vehicle::capacity).max().unwrap_or(0)
    }

    /// Checks the conditions under which no construction can succeed: more
    /// vehicles than clients, or a client heavier than every vehicle.
    pub fn check_feasibility(&self) -> Result<(), CvrpError> {
        if self.vehicles.len() > self.num_clients() {
            return Err(CvrpError::TooManyVehicles {
                vehicles: self.vehicles.len(),
                clients: self.num_clients(),
            });
        }
        let max_capacity = self.max_capacity();
        if let Some(node) = self.nodes[1..].iter().find(|n| n.demand() > max_capacity) {
            return Err(CvrpError::DemandExceedsCapacity {
                client: node.id(),
                demand: node.demand(),
                max_capacity,
            });
        }
        Ok(())
    }
}
