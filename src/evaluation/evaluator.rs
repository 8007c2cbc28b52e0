//! Route builder and solution auditor.

use std::collections::BTreeMap;

use crate::error::CvrpError;
use crate::models::{Instance, Route, Violation};

/// Tolerance used when comparing cached and recomputed fitness values.
const FITNESS_TOLERANCE: f64 = 1e-6;

/// Builds closed routes from client sequences and checks solution
/// invariants against an [`Instance`].
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::evaluation::RouteEvaluator;
/// use u_cvrp::models::{Instance, Node, Vehicle};
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::new(1, 3, 0.0, 0.0),
///     Node::new(2, 4, 0.0, 0.0),
/// ];
/// let dm = DistanceMatrix::from_fn(3, |i, j| if i == j { 0.0 } else { 1.0 });
/// let instance = Instance::new(nodes, vec![Vehicle::new(0, 10)], dm).unwrap();
///
/// let evaluator = RouteEvaluator::new(&instance);
/// let route = evaluator.build_route(0, &[2, 1]).unwrap();
/// assert_eq!(route.nodes(), &[0, 2, 1, 0]);
/// assert_eq!(route.load(), 7);
/// assert!((route.fitness() - 3.0).abs() < 1e-10);
/// assert!(evaluator.audit(&[route]).is_empty());
/// ```
pub struct RouteEvaluator<'a> {
    instance: &'a Instance,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given instance.
    pub fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// Builds a closed route `depot → clients… → depot` for a vehicle,
    /// computing load and fitness while appending.
    ///
    /// Fails if the vehicle is unknown or the load exceeds its capacity.
    pub fn build_route(&self, vehicle_id: usize, clients: &[usize]) -> Result<Route, CvrpError> {
        let vehicle = self.instance.vehicle(vehicle_id).ok_or_else(|| {
            CvrpError::InvalidInstance(format!("unknown vehicle {vehicle_id}"))
        })?;
        let distances = self.instance.distances();

        let mut route = Route::new(vehicle_id);
        route.push(0, 0, distances);
        for &client in clients {
            if client == 0 || client > self.instance.num_clients() {
                return Err(CvrpError::InvalidInstance(format!(
                    "route for vehicle {vehicle_id} contains invalid client {client}"
                )));
            }
            route.push(client, self.instance.demand(client), distances);
        }
        route.push(0, 0, distances);

        if route.load() > vehicle.capacity() {
            return Err(CvrpError::CapacityExceeded {
                vehicle: vehicle_id,
                load: route.load(),
                capacity: vehicle.capacity(),
            });
        }
        Ok(route)
    }

    /// Recomputes the total distance of a route from its node order.
    pub fn route_distance(&self, route: &Route) -> f64 {
        self.instance.distances().path_distance(route.nodes())
    }

    /// Checks every solution invariant: depot placement, capacity, cached
    /// load/fitness, and exact client coverage. Returns all violations found.
    pub fn audit(&self, routes: &[Route]) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut seen: BTreeMap<usize, usize> = BTreeMap::new();
        let n = self.instance.nodes().len();

        for route in routes {
            let vehicle = route.vehicle_id();
            let nodes = route.nodes();

            let interior_has_depot = nodes.len() >= 2 && nodes[1..nodes.len() - 1].contains(&0);
            if !route.is_closed() || interior_has_depot {
                violations.push(Violation::DepotMisplaced { vehicle });
            }
            if nodes.iter().any(|&id| id >= n) {
                violations.push(Violation::UnknownReference { vehicle });
                continue;
            }
            let Some(fleet_entry) = self.instance.vehicle(vehicle) else {
                violations.push(Violation::UnknownReference { vehicle });
                continue;
            };

            let load: i32 = nodes.iter().map(|&id| self.instance.demand(id)).sum();
            if load > fleet_entry.capacity() {
                violations.push(Violation::CapacityExceeded {
                    vehicle,
                    load,
                    capacity: fleet_entry.capacity(),
                });
            }
            if load != route.load()
                || (self.route_distance(route) - route.fitness()).abs() > FITNESS_TOLERANCE
            {
                violations.push(Violation::StaleCache { vehicle });
            }

            for &id in nodes.iter().filter(|&&id| id != 0) {
                *seen.entry(id).or_default() += 1;
            }
        }

        for client in self.instance.client_ids() {
            match seen.get(&client).copied() {
                None => violations.push(Violation::MissingClient { client }),
                Some(1) => {}
                Some(occurrences) => violations.push(Violation::DuplicateClient {
                    client,
                    occurrences,
                }),
            }
        }
        violations
    }
}
