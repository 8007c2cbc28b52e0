//! Greedy nearest-neighbour construction, one vehicle at a time.
//!
//! Each vehicle starts at the depot and repeatedly appends the closest
//! unassigned client whose demand still fits. The compact variant also
//! rejects any hop longer than a fixed threshold once the route has its
//! first client, which leaves spare capacity in exchange for tighter routes.
//!
//! # Complexity
//!
//! O(n²) where n = number of clients.

use crate::error::CvrpError;
use crate::models::Instance;

use super::{into_assignment, Assignment};

/// Builds one route per vehicle by nearest-neighbour extension.
///
/// Clients left over after every vehicle is closed are reported as
/// [`CvrpError::UnassignedClients`].
pub fn nearest_neighbor(instance: &Instance) -> Result<Assignment, CvrpError> {
    greedy(instance, None)
}

/// Nearest-neighbour extension that refuses hops longer than `threshold`
/// from the current route tail. The first hop out of the depot is
/// unbounded.
pub fn compact_nearest_neighbor(
    instance: &Instance,
    threshold: f64,
) -> Result<Assignment, CvrpError> {
    greedy(instance, Some(threshold))
}

fn greedy(instance: &Instance, threshold: Option<f64>) -> Result<Assignment, CvrpError> {
    let distances = instance.distances();
    let mut unassigned: Vec<usize> = instance.client_ids().collect();
    let mut lists = Vec::with_capacity(instance.vehicles().len());

    for vehicle in instance.vehicles() {
        let mut current = 0;
        let mut load = 0;
        let mut clients = Vec::new();

        loop {
            let bounded = threshold.filter(|_| current != 0);
            let candidates: Vec<usize> = unassigned
                .iter()
                .copied()
                .filter(|&c| vehicle.fits(load, instance.demand(c)))
                .filter(|&c| bounded.map_or(true, |t| distances.get(current, c) <= t))
                .collect();
            let Some(next) = distances.nearest_neighbor(current, &candidates) else {
                break;
            };

            unassigned.retain(|&c| c != next);
            load += instance.demand(next);
            clients.push(next);
            current = next;
        }
        lists.push(clients);
    }

    if !unassigned.is_empty() {
        return Err(CvrpError::UnassignedClients {
            clients: unassigned,
        });
    }
    Ok(into_assignment(instance, lists))
}
