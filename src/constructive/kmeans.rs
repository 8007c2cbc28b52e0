//! k-means spatial partitioning on client coordinates.
//!
//! Centres are seeded with k-means++ from the caller's generator, then
//! refined with Lloyd iterations over `(latitude, longitude)` until the
//! labels stop changing or the iteration cap is hit. Centre `i` belongs to
//! the `i`-th vehicle in ascending id order.
//!
//! Clients are then placed in ascending id order on the vehicle whose centre
//! is nearest, falling back to the next-nearest centre while the load would
//! overflow.
//!
//! # Reference
//!
//! Arthur, D. & Vassilvitskii, S. (2007). "k-means++: The Advantages of
//! Careful Seeding", *Proc. SODA*, 1027-1035.

use rand::Rng;

use crate::error::CvrpError;
use crate::models::Instance;

use super::{into_assignment, remaining_capacities, Assignment};

type Point = (f64, f64);

fn sq_dist(a: Point, b: Point) -> f64 {
    let (dx, dy) = (a.0 - b.0, a.1 - b.1);
    dx * dx + dy * dy
}

/// Partitions clients into one k-means cluster per vehicle with
/// capacity-aware nearest-centre placement.
pub fn kmeans_partition<R: Rng>(
    instance: &Instance,
    max_iterations: usize,
    rng: &mut R,
) -> Result<Assignment, CvrpError> {
    let clients: Vec<usize> = instance.client_ids().collect();
    let points: Vec<Point> = clients
        .iter()
        .filter_map(|&c| instance.node(c))
        .map(|n| (n.latitude(), n.longitude()))
        .collect();
    let k = instance.vehicles().len();

    let centres = lloyd(&points, seed_centres(&points, k, rng), max_iterations);

    let mut remaining = remaining_capacities(instance);
    let mut lists = vec![Vec::new(); k];
    for (&client, &point) in clients.iter().zip(&points) {
        let demand = instance.demand(client);
        let slot = centres_by_distance(&centres, point)
            .into_iter()
            .find(|&s| demand <= remaining[s])
            .ok_or(CvrpError::NoCapacityForClient { client, demand })?;
        remaining[slot] -= demand;
        lists[slot].push(client);
    }
    Ok(into_assignment(instance, lists))
}

/// k-means++ seeding: first centre uniform, each next one drawn with
/// probability proportional to the squared distance to the nearest chosen
/// centre.
fn seed_centres<R: Rng>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    let mut centres = Vec::with_capacity(k);
    if points.is_empty() || k == 0 {
        return centres;
    }
    centres.push(points[rng.random_range(0..points.len())]);

    let mut nearest: Vec<f64> = points.iter().map(|&p| sq_dist(p, centres[0])).collect();
    while centres.len() < k {
        let total: f64 = nearest.iter().sum();
        let pick = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, &w) in nearest.iter().enumerate() {
                if w > 0.0 && target < w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            // All points coincide with a centre.
            rng.random_range(0..points.len())
        };

        let centre = points[pick];
        centres.push(centre);
        for (d, &p) in nearest.iter_mut().zip(points) {
            *d = d.min(sq_dist(p, centre));
        }
    }
    centres
}

/// Index of the nearest centre, lowest index winning ties.
fn nearest_centre(centres: &[Point], p: Point) -> usize {
    centres_by_distance(centres, p)
        .first()
        .copied()
        .unwrap_or(0)
}

/// Centre indices sorted by distance to `p`, ties by index.
fn centres_by_distance(centres: &[Point], p: Point) -> Vec<usize> {
    let mut order: Vec<usize> = (0..centres.len()).collect();
    order.sort_by(|&a, &b| {
        sq_dist(p, centres[a])
            .total_cmp(&sq_dist(p, centres[b]))
            .then(a.cmp(&b))
    });
    order
}

/// Lloyd refinement. A centre that loses all its points stays where it is.
fn lloyd(points: &[Point], mut centres: Vec<Point>, max_iterations: usize) -> Vec<Point> {
    if centres.is_empty() {
        return centres;
    }
    let mut labels: Vec<usize> = points.iter().map(|&p| nearest_centre(&centres, p)).collect();

    for _ in 0..max_iterations {
        let mut sums = vec![(0.0, 0.0, 0usize); centres.len()];
        for (&p, &l) in points.iter().zip(&labels) {
            sums[l].0 += p.0;
            sums[l].1 += p.1;
            sums[l].2 += 1;
        }
        for (centre, &(sx, sy, n)) in centres.iter_mut().zip(&sums) {
            if n > 0 {
                *centre = (sx / n as f64, sy / n as f64);
            }
        }

        let next: Vec<usize> = points.iter().map(|&p| nearest_centre(&centres, p)).collect();
        if next == labels {
            break;
        }
        labels = next;
    }
    centres
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::test_fixtures::{planar_instance, two_groups};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_separated_groups_stay_together() {
        let instance = two_groups();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let assignment = kmeans_partition(&instance, 100, &mut rng).expect("fits");
            let mut groups: Vec<Vec<usize>> = assignment.values().cloned().collect();
            groups.sort();
            assert_eq!(groups, vec![vec![1, 2], vec![3, 4]], "seed {seed}");
        }
    }

    #[test]
    fn test_same_seed_same_partition() {
        let instance = planar_instance(
            &[(0.0, 0.0), (1.0, 3.0), (2.0, -1.0), (-4.0, 2.0), (3.0, 3.0), (-1.0, -5.0)],
            &[1, 2, 3, 2, 1],
            &[5, 5],
        );
        let a = kmeans_partition(&instance, 50, &mut ChaCha8Rng::seed_from_u64(9)).expect("fits");
        let b = kmeans_partition(&instance, 50, &mut ChaCha8Rng::seed_from_u64(9)).expect("fits");
        assert_eq!(a, b);
    }

    #[test]
    fn test_falls_back_to_next_nearest_centre() {
        // Three clients near x = 1 exceed one vehicle; the third spills over.
        let instance = planar_instance(
            &[(0.0, 0.0), (1.0, 0.0), (1.1, 0.0), (1.2, 0.0), (-9.0, 0.0)],
            &[4, 4, 4, 1],
            &[8, 8],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let assignment = kmeans_partition(&instance, 100, &mut rng).expect("fits");
        let loads: Vec<i32> = assignment
            .values()
            .map(|cs| cs.iter().map(|&c| instance.demand(c)).sum())
            .collect();
        assert!(loads.iter().all(|&l| l <= 8));
        assert_eq!(assignment.values().map(Vec::len).sum::<usize>(), 4);
    }

    #[test]
    fn test_seeding_handles_coincident_points() {
        let points = vec![(1.0, 1.0); 4];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let centres = seed_centres(&points, 3, &mut rng);
        assert_eq!(centres, vec![(1.0, 1.0); 3]);
    }

    #[test]
    fn test_lloyd_keeps_empty_centre() {
        let points = vec![(0.0, 0.0), (0.0, 2.0)];
        let centres = lloyd(&points, vec![(0.0, 1.0), (50.0, 50.0)], 10);
        assert_eq!(centres, vec![(0.0, 1.0), (50.0, 50.0)]);
    }
}
