//! Construction strategies producing an initial, capacity-feasible
//! partition of clients into per-vehicle visiting lists.
//!
//! - [`hierarchical_clustering`]: Ward agglomerative clustering cut to one group per vehicle
//! - [`kmeans_partition`]: k-means++ spatial partitioning with next-nearest-centre fallback
//! - [`nearest_neighbor()`]: Greedy nearest-neighbour per vehicle, and
//!   [`compact_nearest_neighbor`] bounded by a compactness threshold
//! - [`Strategy::ExternalSolver`]: Whole-problem delegation to `vrp-core` (feature `external-solver`)
//!
//! Every strategy iterates vehicles in ascending id order, resolves distance
//! ties to the lowest client id, and either assigns every client or fails.

mod external;
mod hierarchical;
mod kmeans;
mod nearest_neighbor;

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConstructionConfig;
use crate::error::CvrpError;
use crate::models::Instance;

pub use hierarchical::hierarchical_clustering;
pub use kmeans::kmeans_partition;
pub use nearest_neighbor::{compact_nearest_neighbor, nearest_neighbor};

/// Ordered client ids per vehicle id, depot excluded.
///
/// Every vehicle of the instance has an entry, possibly empty.
pub type Assignment = BTreeMap<usize, Vec<usize>>;

/// Construction strategy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Capacity-aware Ward hierarchical clustering.
    HierarchicalClustering,
    /// k-means spatial partitioning.
    KMeans,
    /// Greedy nearest-neighbour per vehicle.
    NearestNeighbor,
    /// Nearest-neighbour that rejects hops above the compactness threshold.
    CompactNearestNeighbor,
    /// Delegation to an external VRP solver.
    ExternalSolver,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 5] = [
        Strategy::HierarchicalClustering,
        Strategy::KMeans,
        Strategy::NearestNeighbor,
        Strategy::CompactNearestNeighbor,
        Strategy::ExternalSolver,
    ];

    /// Short stable name used in logs and configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::HierarchicalClustering => "hierarchical_clustering",
            Strategy::KMeans => "k_means",
            Strategy::NearestNeighbor => "nearest_neighbor",
            Strategy::CompactNearestNeighbor => "compact_nearest_neighbor",
            Strategy::ExternalSolver => "external_solver",
        }
    }

    /// Returns `true` if the strategy can run in this build.
    pub fn is_available(&self) -> bool {
        match self {
            Strategy::ExternalSolver => cfg!(feature = "external-solver"),
            _ => true,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatches a [`Strategy`] tag to its construction routine.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_cvrp::config::ConstructionConfig;
/// use u_cvrp::constructive::{RouteConstructor, Strategy};
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::models::{Instance, Node, Vehicle};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::new(1, 3, 0.0, 0.01),
///     Node::new(2, 4, 0.0, 0.02),
///     Node::new(3, 2, 0.0, -0.01),
///     Node::new(4, 5, 0.0, -0.02),
/// ];
/// let dm = DistanceMatrix::from_nodes(&nodes);
/// let instance = Instance::new(nodes, vec![Vehicle::new(0, 7), Vehicle::new(1, 7)], dm).unwrap();
///
/// let config = ConstructionConfig::default();
/// let constructor = RouteConstructor::new(&instance, &config);
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let assignment = constructor.construct(Strategy::NearestNeighbor, &mut rng).unwrap();
/// assert_eq!(assignment[&0], vec![1, 2]);
/// assert_eq!(assignment[&1], vec![3, 4]);
/// ```
pub struct RouteConstructor<'a> {
    instance: &'a Instance,
    config: &'a ConstructionConfig,
}

impl<'a> RouteConstructor<'a> {
    /// Creates a constructor over a validated instance.
    pub fn new(instance: &'a Instance, config: &'a ConstructionConfig) -> Self {
        Self { instance, config }
    }

    /// Builds an assignment of every client to exactly one vehicle.
    ///
    /// Fails with an infeasibility error when the fleet outnumbers the
    /// clients, a client is heavier than every vehicle, or the strategy
    /// cannot place every client.
    pub fn construct<R: Rng>(&self, strategy: Strategy, rng: &mut R) -> Result<Assignment, CvrpError> {
        self.instance.check_feasibility()?;

        let assignment = match strategy {
            Strategy::HierarchicalClustering => hierarchical_clustering(self.instance)?,
            Strategy::KMeans => {
                kmeans_partition(self.instance, self.config.kmeans_max_iterations, rng)?
            }
            Strategy::NearestNeighbor => nearest_neighbor(self.instance)?,
            Strategy::CompactNearestNeighbor => {
                compact_nearest_neighbor(self.instance, self.config.compactness_threshold)?
            }
            Strategy::ExternalSolver => external::solve(self.instance, self.config)?,
        };

        debug!(
            strategy = %strategy,
            routes = assignment.values().filter(|c| !c.is_empty()).count(),
            "construction finished"
        );
        Ok(assignment)
    }
}

/// Remaining capacity per vehicle, indexed like `Instance::vehicles()`.
pub(crate) fn remaining_capacities(instance: &Instance) -> Vec<i32> {
    instance.vehicles().iter().map(|v| v.capacity()).collect()
}

/// Converts per-vehicle-index client lists into an [`Assignment`] keyed by
/// vehicle id.
pub(crate) fn into_assignment(instance: &Instance, lists: Vec<Vec<usize>>) -> Assignment {
    instance
        .vehicles()
        .iter()
        .map(|v| v.id())
        .zip(lists)
        .collect()
}

/// Places `client` on the first vehicle (ascending id) with room for it.
pub(crate) fn place_first_fit(
    instance: &Instance,
    remaining: &mut [i32],
    lists: &mut [Vec<usize>],
    client: usize,
) -> Result<(), CvrpError> {
    let demand = instance.demand(client);
    let slot = remaining
        .iter()
        .position(|&room| demand <= room)
        .ok_or(CvrpError::NoCapacityForClient { client, demand })?;
    remaining[slot] -= demand;
    lists[slot].push(client);
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use crate::distance::DistanceMatrix;
    use crate::models::{Instance, Node, Vehicle};

    /// Builds an instance from planar points (index 0 = depot) with a
    /// Euclidean matrix. Coordinates are stored as (latitude, longitude) =
    /// (y, x) so spatial strategies see the same geometry.
    pub fn planar_instance(points: &[(f64, f64)], demands: &[i32], capacities: &[i32]) -> Instance {
        let nodes: Vec<Node> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                if i == 0 {
                    Node::depot(y, x)
                } else {
                    Node::new(i, demands[i - 1], y, x)
                }
            })
            .collect();
        let dm = DistanceMatrix::from_fn(points.len(), |i, j| {
            let (dx, dy) = (points[i].0 - points[j].0, points[i].1 - points[j].1);
            (dx * dx + dy * dy).sqrt()
        });
        let vehicles = capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Vehicle::new(i, c))
            .collect();
        Instance::new(nodes, vehicles, dm).expect("valid fixture")
    }

    /// Two well-separated groups: clients 1-2 east of the depot, 3-4 west.
    pub fn two_groups() -> Instance {
        planar_instance(
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (-1.0, 0.0), (-2.0, 0.0)],
            &[3, 4, 2, 5],
            &[7, 7],
        )
    }
}
