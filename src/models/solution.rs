//! Read-only solution view and invariant violations.

use serde::{Deserialize, Serialize};

/// A broken solution invariant found by
/// [`RouteEvaluator::audit`](crate::evaluation::RouteEvaluator::audit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    /// A client is served by no route.
    MissingClient {
        /// Client node id.
        client: usize,
    },
    /// A client appears more than once across the routes.
    DuplicateClient {
        /// Client node id.
        client: usize,
        /// Number of occurrences.
        occurrences: usize,
    },
    /// A route does not start and end at the depot, or visits it in between.
    DepotMisplaced {
        /// Vehicle id of the route.
        vehicle: usize,
    },
    /// A route refers to an unknown vehicle or node.
    UnknownReference {
        /// Vehicle id of the route.
        vehicle: usize,
    },
    /// Route load exceeds the vehicle capacity.
    CapacityExceeded {
        /// Vehicle id of the route.
        vehicle: usize,
        /// Load of the route.
        load: i32,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Cached load or fitness differs from the recomputed value.
    StaleCache {
        /// Vehicle id of the route.
        vehicle: usize,
    },
}

/// Per-vehicle part of a [`Solution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Vehicle serving the route.
    pub vehicle_id: usize,
    /// Visiting order including the leading and trailing depot.
    pub nodes: Vec<usize>,
    /// Total distance of the route.
    pub distance: f64,
    /// Total demand served by the route.
    pub load: i32,
}

/// Output contract of a solve session: the winning individual flattened into
/// plain data for persistence, map rendering, or dashboards.
///
/// # Examples
///
/// ```
/// use u_cvrp::models::{RouteSummary, Solution};
///
/// let sol = Solution::new(vec![
///     RouteSummary { vehicle_id: 1, nodes: vec![0, 2, 1, 0], distance: 12.5, load: 7 },
///     RouteSummary { vehicle_id: 2, nodes: vec![0, 3, 0], distance: 4.0, load: 5 },
/// ]);
/// assert_eq!(sol.num_routes(), 2);
/// assert_eq!(sol.num_served(), 3);
/// assert!((sol.fitness - 16.5).abs() < 1e-10);
/// assert_eq!(sol.route_for(2).map(|r| r.load), Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Routes ordered by vehicle id.
    pub routes: Vec<RouteSummary>,
    /// Sum of all route distances.
    pub fitness: f64,
}

impl Solution {
    /// Creates a solution, deriving the aggregate fitness from the routes.
    pub fn new(mut routes: Vec<RouteSummary>) -> Self {
        routes.sort_by_key(|r| r.vehicle_id);
        let fitness = routes.iter().map(|r| r.distance).sum();
        Self { routes, fitness }
    }

    /// Number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of clients served across all routes.
    pub fn num_served(&self) -> usize {
        self.routes
            .iter()
            .map(|r| r.nodes.len().saturating_sub(2))
            .sum()
    }

    /// Route of the given vehicle, if it is used.
    pub fn route_for(&self, vehicle_id: usize) -> Option<&RouteSummary> {
        self.routes.iter().find(|r| r.vehicle_id == vehicle_id)
    }
}
