//! Capacity-aware Ward hierarchical clustering.
//!
//! # Algorithm
//!
//! 1. Agglomerate clients bottom-up with Ward linkage over the distance
//!    matrix, merging the closest pair until one cluster per vehicle remains.
//! 2. Order the clusters by their smallest client id and hand them to the
//!    vehicles in ascending id order.
//! 3. Walk the clients in ascending id order. A client that would overflow
//!    its cluster's vehicle goes to the first vehicle with room instead.
//!
//! Cluster distances follow the Lance–Williams recurrence for Ward's
//! method:
//!
//! ```text
//! d(k, i∪j)² = ((nₖ+nᵢ)·d(k,i)² + (nₖ+nⱼ)·d(k,j)² − nₖ·d(i,j)²) / (nₖ+nᵢ+nⱼ)
//! ```
//!
//! # Complexity
//!
//! O(n³) time and O(n²) memory where n = number of clients.
//!
//! # Reference
//!
//! Ward, J.H. (1963). "Hierarchical Grouping to Optimize an Objective
//! Function", *Journal of the American Statistical Association* 58(301),
//! 236-244.

use crate::error::CvrpError;
use crate::models::Instance;

use super::{into_assignment, place_first_fit, remaining_capacities, Assignment};

/// Partitions clients into one Ward cluster per vehicle and assigns them
/// with first-fit overflow.
pub fn hierarchical_clustering(instance: &Instance) -> Result<Assignment, CvrpError> {
    let n_vehicles = instance.vehicles().len();
    let clients: Vec<usize> = instance.client_ids().collect();
    let clusters = ward_clusters(instance, &clients, n_vehicles);

    // Cluster position (in vehicle order) of each client, indexed by client id.
    let mut owner = vec![0usize; instance.nodes().len()];
    for (slot, members) in clusters.iter().enumerate() {
        for &c in members {
            owner[c] = slot;
        }
    }

    let mut remaining = remaining_capacities(instance);
    let mut lists = vec![Vec::new(); n_vehicles];
    for &client in &clients {
        let slot = owner[client];
        let demand = instance.demand(client);
        if demand <= remaining[slot] {
            remaining[slot] -= demand;
            lists[slot].push(client);
        } else {
            place_first_fit(instance, &mut remaining, &mut lists, client)?;
        }
    }
    Ok(into_assignment(instance, lists))
}

/// Ward agglomeration of `clients` down to `k` clusters, each sorted
/// ascending, and the clusters sorted by their first member.
fn ward_clusters(instance: &Instance, clients: &[usize], k: usize) -> Vec<Vec<usize>> {
    let n = clients.len();
    let distances = instance.distances();

    let mut members: Vec<Vec<usize>> = clients.iter().map(|&c| vec![c]).collect();
    let mut active = vec![true; n];
    let mut dist: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| distances.get(clients[i], clients[j])).collect())
        .collect();

    let mut count = n;
    while count > k.max(1) {
        let Some((a, b)) = closest_pair(&dist, &active) else {
            break;
        };

        let (na, nb) = (members[a].len() as f64, members[b].len() as f64);
        let dab = dist[a][b];
        for m in 0..n {
            if !active[m] || m == a || m == b {
                continue;
            }
            let nm = members[m].len() as f64;
            let (dam, dbm) = (dist[a][m], dist[b][m]);
            let sq = ((nm + na) * dam * dam + (nm + nb) * dbm * dbm - nm * dab * dab)
                / (nm + na + nb);
            let d = sq.max(0.0).sqrt();
            dist[a][m] = d;
            dist[m][a] = d;
        }

        let absorbed = std::mem::take(&mut members[b]);
        members[a].extend(absorbed);
        active[b] = false;
        count -= 1;
    }

    let mut clusters: Vec<Vec<usize>> = members
        .into_iter()
        .zip(active)
        .filter(|(_, alive)| *alive)
        .map(|(mut m, _)| {
            m.sort_unstable();
            m
        })
        .collect();
    clusters.sort_by_key(|m| m.first().copied().unwrap_or(usize::MAX));
    clusters
}

/// Active pair `(a, b)` with `a < b` at minimum distance, the
/// lexicographically smallest pair winning ties.
fn closest_pair(dist: &[Vec<f64>], active: &[bool]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for a in 0..dist.len() {
        if !active[a] {
            continue;
        }
        for b in (a + 1)..dist.len() {
            if !active[b] {
                continue;
            }
            let d = dist[a][b];
            if best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((a, b, d));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::test_fixtures::{planar_instance, two_groups};

    #[test]
    fn test_two_groups_split_cleanly() {
        let assignment = hierarchical_clustering(&two_groups()).expect("fits");
        assert_eq!(assignment[&0], vec![1, 2]);
        assert_eq!(assignment[&1], vec![3, 4]);
    }

    #[test]
    fn test_ward_merges_nearest_first() {
        let instance = planar_instance(
            &[(0.0, 0.0), (0.0, 1.0), (0.0, 1.1), (5.0, 0.0), (5.1, 0.0), (5.0, 0.2)],
            &[1, 1, 1, 1, 1],
            &[10, 10],
        );
        let clients: Vec<usize> = instance.client_ids().collect();
        let clusters = ward_clusters(&instance, &clients, 2);
        assert_eq!(clusters, vec![vec![1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn test_overflow_goes_to_first_vehicle_with_room() {
        // Three clients clustered together, one far away; the cluster cannot
        // fit into one vehicle.
        let instance = planar_instance(
            &[(0.0, 0.0), (1.0, 0.0), (1.1, 0.0), (1.2, 0.0), (-9.0, 0.0)],
            &[4, 4, 4, 1],
            &[8, 8],
        );
        let assignment = hierarchical_clustering(&instance).expect("fits");
        assert_eq!(assignment[&0], vec![1, 2]);
        assert_eq!(assignment[&1], vec![3, 4]);
    }

    #[test]
    fn test_no_room_anywhere_is_fatal() {
        let instance = planar_instance(
            &[(0.0, 0.0), (1.0, 0.0), (1.1, 0.0), (-1.0, 0.0)],
            &[5, 5, 5],
            &[6, 6],
        );
        assert_eq!(
            hierarchical_clustering(&instance),
            Err(CvrpError::NoCapacityForClient {
                client: 3,
                demand: 5
            })
        );
    }

    #[test]
    fn test_one_cluster_per_vehicle_even_when_clients_coincide() {
        let instance = planar_instance(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 0.0)],
            &[1, 1, 1],
            &[5, 5, 5],
        );
        let clients: Vec<usize> = instance.client_ids().collect();
        let clusters = ward_clusters(&instance, &clients, 3);
        assert_eq!(clusters, vec![vec![1], vec![2], vec![3]]);
    }
}
