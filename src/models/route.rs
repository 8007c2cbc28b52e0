//! Route type.

use crate::distance::DistanceMatrix;

/// An ordered sequence of node ids served by one vehicle.
///
/// A closed route starts and ends at the depot (node 0); both depot entries
/// are stored. Load and fitness (total distance) are cached and maintained
/// incrementally while nodes are appended. Improvement procedures only
/// reorder interior positions through [`Route::path_mut`], which hands out a
/// fixed-length slice.
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::models::Route;
///
/// let dm = DistanceMatrix::from_data(3, vec![
///     0.0, 2.0, 3.0,
///     2.0, 0.0, 4.0,
///     3.0, 4.0, 0.0,
/// ]).unwrap();
///
/// let mut route = Route::new(0);
/// route.push(0, 0, &dm);
/// route.push(1, 5, &dm);
/// route.push(2, 3, &dm);
/// route.push(0, 0, &dm);
///
/// assert!(route.is_closed());
/// assert_eq!(route.client_ids(), vec![1, 2]);
/// assert_eq!(route.load(), 8);
/// assert!((route.fitness() - 9.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    vehicle_id: usize,
    nodes: Vec<usize>,
    load: i32,
    fitness: f64,
}

impl Route {
    /// Creates an empty route for the given vehicle.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            nodes: Vec::new(),
            load: 0,
            fitness: 0.0,
        }
    }

    /// Appends a node, adding its demand to the load and the connecting edge
    /// to the fitness.
    pub fn push(&mut self, node: usize, demand: i32, distances: &DistanceMatrix) {
        if let Some(&last) = self.nodes.last() {
            self.fitness += distances.get(last, node);
        }
        self.load += demand;
        self.nodes.push(node);
    }

    /// Id of the vehicle serving this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Full visiting order, depot entries included.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Full visiting order as a fixed-length mutable slice.
    ///
    /// Callers must keep the first and last entries in place and must call
    /// [`Route::recompute_fitness`] afterwards.
    pub fn path_mut(&mut self) -> &mut [usize] {
        &mut self.nodes
    }

    /// Client ids in visiting order (depot entries excluded).
    pub fn client_ids(&self) -> Vec<usize> {
        if self.nodes.len() < 2 {
            return Vec::new();
        }
        self.nodes[1..self.nodes.len() - 1].to_vec()
    }

    /// Number of clients on this route.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(2)
    }

    /// Returns `true` if the route serves no client.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the route starts and ends at the depot.
    pub fn is_closed(&self) -> bool {
        self.nodes.len() >= 2 && self.nodes[0] == 0 && self.nodes[self.nodes.len() - 1] == 0
    }

    /// Cached total demand of the clients on this route.
    pub fn load(&self) -> i32 {
        self.load
    }

    /// Cached total distance along the current order.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Overwrites the cached fitness.
    #[cfg(test)]
    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Recomputes the fitness from scratch and stores it.
    pub fn recompute_fitness(&mut self, distances: &DistanceMatrix) -> f64 {
        self.fitness = distances.path_distance(&self.nodes);
        self.fitness
    }
}
