//! Budgeted Lin–Kernighan style deep search.
//!
//! # Algorithm
//!
//! Each iteration anchors a chain at `t1 = p[i]` and breaks the edge to its
//! successor. Every step of the chain is a 2-opt reversal `p[i+1..=j]` that
//! keeps `t1` fixed, chosen so the partial gain
//!
//! ```text
//! G = Σ removed − Σ added (closing edge excluded)
//! ```
//!
//! stays positive. Edges added by the chain are never broken again within
//! it. The chain stops at `max_depth` steps or when no candidate keeps the
//! gain positive, and is then rolled back to its most profitable prefix.
//!
//! A sweep tries every anchor. When a sweep finds nothing and perturbation
//! is enabled, the best order so far receives a random double-bridge kick
//! and the search continues from there.
//!
//! The search stops at whichever comes first: `max_iterations` chains,
//! `max_duration` of wall-clock time, or a local optimum without
//! perturbation. It always leaves the best order seen in the path.
//!
//! # Reference
//!
//! Lin, S. & Kernighan, B.W. (1973). "An Effective Heuristic Algorithm for
//! the Traveling-Salesman Problem", *Operations Research* 21(2), 498-516.
//!
//! Martin, O., Otto, S.W. & Felten, E.W. (1991). "Large-Step Markov Chains
//! for the Traveling Salesman Problem", *Complex Systems* 5(3), 299-326.

use std::time::Instant;

use rand::Rng;
use serde::Serialize;

use crate::config::DeepSearchConfig;
use crate::distance::DistanceMatrix;

use super::two_opt::two_opt_delta;
use super::IMPROVEMENT_EPSILON;

/// Why the deep search returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `max_iterations` chains were attempted.
    IterationLimit,
    /// `max_duration` elapsed.
    TimeLimit,
    /// A full sweep found nothing and perturbation is disabled, or the route
    /// is too short to search.
    LocalOptimum,
}

/// Summary of one deep search run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeepSearchOutcome {
    /// Chains attempted.
    pub iterations: usize,
    /// Double-bridge kicks applied.
    pub kicks: usize,
    /// Distance saved relative to the input order. Never negative.
    pub gain: f64,
    /// Stopping condition that ended the search.
    pub stop: StopReason,
}

/// Runs the budgeted deep search on a closed path in place.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_cvrp::config::DeepSearchConfig;
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::local_search::{deep_search, StopReason};
///
/// let xs = [0.0_f64, 1.0, 2.0, 3.0, 4.0, 5.0];
/// let dm = DistanceMatrix::from_fn(6, |i, j| (xs[i] - xs[j]).abs());
/// let config = DeepSearchConfig::default()
///     .with_max_iterations(50)
///     .with_max_duration(Duration::from_secs(1));
///
/// let mut path = vec![0, 3, 1, 5, 2, 4, 0];
/// let before = dm.path_distance(&path);
/// let outcome = deep_search(&mut path, &dm, &config, &mut ChaCha8Rng::seed_from_u64(1));
///
/// assert!(outcome.iterations <= 50);
/// assert_eq!(outcome.stop, StopReason::IterationLimit);
/// assert!((dm.path_distance(&path) - 10.0).abs() < 1e-9);
/// assert!((before - outcome.gain - 10.0).abs() < 1e-9);
/// ```
pub fn deep_search<R: Rng>(
    path: &mut [usize],
    distances: &DistanceMatrix,
    config: &DeepSearchConfig,
    rng: &mut R,
) -> DeepSearchOutcome {
    let started = Instant::now();
    let m = path.len();
    let mut outcome = DeepSearchOutcome {
        iterations: 0,
        kicks: 0,
        gain: 0.0,
        stop: StopReason::LocalOptimum,
    };
    if m < 5 || config.max_depth == 0 {
        return outcome;
    }

    let initial = distances.path_distance(path);
    let mut best = path.to_vec();
    let mut best_cost = initial;
    let mut current = path.to_vec();
    let mut current_cost = initial;

    outcome.stop = 'search: loop {
        let mut improved = false;
        for i in 0..m - 3 {
            if outcome.iterations >= config.max_iterations {
                break 'search StopReason::IterationLimit;
            }
            if started.elapsed() >= config.max_duration {
                break 'search StopReason::TimeLimit;
            }
            outcome.iterations += 1;

            let gain = improve_chain(&mut current, distances, i, config.max_depth);
            if gain > 0.0 {
                current_cost -= gain;
                improved = true;
                if current_cost < best_cost - IMPROVEMENT_EPSILON {
                    best.copy_from_slice(&current);
                    best_cost = current_cost;
                }
            }
        }
        if improved {
            continue;
        }

        // Double bridge needs four interior nodes.
        if !config.perturb || m - 2 < 4 {
            break StopReason::LocalOptimum;
        }
        current.copy_from_slice(&best);
        double_bridge(&mut current, rng);
        current_cost = distances.path_distance(&current);
        outcome.kicks += 1;
    };

    path.copy_from_slice(&best);
    outcome.gain = (initial - best_cost).max(0.0);
    outcome
}

/// Builds one improving chain anchored at position `i` and returns its
/// gain, leaving the path unchanged when no prefix of the chain improves.
fn improve_chain(path: &mut [usize], distances: &DistanceMatrix, i: usize, max_depth: usize) -> f64 {
    let m = path.len();
    let t1 = path[i];
    let mut applied: Vec<usize> = Vec::with_capacity(max_depth);
    let mut added: Vec<(usize, usize)> = Vec::with_capacity(2 * max_depth);
    let mut total = 0.0;
    let mut best_total = 0.0;
    let mut best_len = 0;

    for _ in 0..max_depth {
        let t2 = path[i + 1];
        let open = total + distances.get(t1, t2);

        let mut choice: Option<(usize, f64)> = None;
        for j in (i + 2)..m - 1 {
            let (c, d) = (path[j], path[j + 1]);
            if is_added(&added, c, d) {
                continue;
            }
            let partial = open - distances.get(t2, d);
            if partial <= IMPROVEMENT_EPSILON {
                continue;
            }
            let score = partial + distances.get(c, d);
            if choice.map_or(true, |(_, s)| score > s) {
                choice = Some((j, score));
            }
        }
        let Some((j, _)) = choice else {
            break;
        };

        let delta = two_opt_delta(path, distances, i, j);
        path[i + 1..=j].reverse();
        added.push((t2, path[j + 1]));
        added.push((t1, path[i + 1]));
        applied.push(j);
        total -= delta;

        if total > best_total + IMPROVEMENT_EPSILON {
            best_total = total;
            best_len = applied.len();
        }
    }

    while applied.len() > best_len {
        if let Some(j) = applied.pop() {
            path[i + 1..=j].reverse();
        }
    }
    best_total
}

fn is_added(added: &[(usize, usize)], u: usize, v: usize) -> bool {
    added
        .iter()
        .any(|&(a, b)| (a == u && b == v) || (a == v && b == u))
}

/// Reorders the interior `A B C D` as `A C B D` at three random cuts.
fn double_bridge<R: Rng>(path: &mut [usize], rng: &mut R) {
    let interior = path.len() - 2;
    let mut cuts = rand::seq::index::sample(rng, interior - 1, 3).into_vec();
    cuts.sort_unstable();
    let (a, b, c) = (cuts[0] + 1, cuts[1] + 1, cuts[2] + 1);

    let inner = &mut path[1..=interior];
    let mut reordered = Vec::with_capacity(interior);
    reordered.extend_from_slice(&inner[..a]);
    reordered.extend_from_slice(&inner[b..c]);
    reordered.extend_from_slice(&inner[a..b]);
    reordered.extend_from_slice(&inner[c..]);
    inner.copy_from_slice(&reordered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    fn ring(n: usize) -> DistanceMatrix {
        // Points on a circle; the optimal tour visits them in angle order.
        let pts: Vec<(f64, f64)> = (0..n)
            .map(|k| {
                let a = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
                (a.cos(), a.sin())
            })
            .collect();
        DistanceMatrix::from_fn(n, move |i, j| {
            let (dx, dy) = (pts[i].0 - pts[j].0, pts[i].1 - pts[j].1);
            (dx * dx + dy * dy).sqrt()
        })
    }

    fn scrambled(n: usize) -> Vec<usize> {
        let mut path = vec![0];
        path.extend((1..n).step_by(2));
        path.extend((2..n).step_by(2));
        path.push(0);
        path
    }

    #[test]
    fn test_never_worse_and_keeps_endpoints() {
        let dm = ring(12);
        let mut path = scrambled(12);
        let before = dm.path_distance(&path);
        let config = DeepSearchConfig::default()
            .with_max_iterations(200)
            .with_max_duration(Duration::from_secs(5));
        let outcome = deep_search(&mut path, &dm, &config, &mut ChaCha8Rng::seed_from_u64(7));

        let after = dm.path_distance(&path);
        assert!(after <= before + 1e-9);
        assert!((before - outcome.gain - after).abs() < 1e-9);
        assert_eq!((path[0], path[path.len() - 1]), (0, 0));
        let mut ids = path[1..path.len() - 1].to_vec();
        ids.sort_unstable();
        assert_eq!(ids, (1..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_iteration_budget_is_respected() {
        let dm = ring(10);
        let mut path = scrambled(10);
        let config = DeepSearchConfig::default()
            .with_max_iterations(3)
            .with_max_duration(Duration::from_secs(60));
        let outcome = deep_search(&mut path, &dm, &config, &mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.stop, StopReason::IterationLimit);
    }

    #[test]
    fn test_zero_duration_returns_input() {
        let dm = ring(10);
        let mut path = scrambled(10);
        let original = path.clone();
        let config = DeepSearchConfig::default().with_max_duration(Duration::ZERO);
        let outcome = deep_search(&mut path, &dm, &config, &mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!(outcome.stop, StopReason::TimeLimit);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(path, original);
    }

    #[test]
    fn test_time_budget_stops_a_long_search() {
        let dm = ring(400);
        let mut path = scrambled(400);
        let before = dm.path_distance(&path);
        let budget = Duration::from_millis(50);
        let config = DeepSearchConfig::default()
            .with_max_iterations(usize::MAX)
            .with_max_duration(budget);

        let started = std::time::Instant::now();
        let outcome = deep_search(&mut path, &dm, &config, &mut ChaCha8Rng::seed_from_u64(3));
        let elapsed = started.elapsed();

        assert_eq!(outcome.stop, StopReason::TimeLimit);
        assert!(outcome.iterations > 0);
        assert!(elapsed >= budget);
        assert!(elapsed < budget + Duration::from_secs(2), "took {elapsed:?}");
        assert!(dm.path_distance(&path) <= before + 1e-9);
    }

    #[test]
    fn test_without_perturbation_stops_at_local_optimum() {
        let dm = ring(8);
        let mut path = vec![0, 1, 2, 3, 4, 5, 6, 7, 0];
        let config = DeepSearchConfig::default()
            .with_perturb(false)
            .with_max_iterations(10_000);
        let outcome = deep_search(&mut path, &dm, &config, &mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!(outcome.stop, StopReason::LocalOptimum);
        assert_eq!(outcome.kicks, 0);
        assert_eq!(outcome.gain, 0.0);
        assert_eq!(path, vec![0, 1, 2, 3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn test_chain_rolls_back_when_unprofitable() {
        let dm = ring(8);
        let mut path = vec![0, 1, 2, 3, 4, 5, 6, 7, 0];
        for i in 0..path.len() - 3 {
            assert_eq!(improve_chain(&mut path, &dm, i, 6), 0.0);
            assert_eq!(path, vec![0, 1, 2, 3, 4, 5, 6, 7, 0]);
        }
    }

    #[test]
    fn test_chain_gain_matches_distance() {
        let dm = ring(9);
        let mut path = scrambled(9);
        let mut total = 0.0;
        for i in 0..path.len() - 3 {
            let before = dm.path_distance(&path);
            let gain = improve_chain(&mut path, &dm, i, 6);
            assert!(gain >= 0.0);
            assert!((dm.path_distance(&path) - (before - gain)).abs() < 1e-9);
            total += gain;
        }
        assert!(total > 0.0);
    }

    #[test]
    fn test_double_bridge_keeps_nodes() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let mut path = vec![0, 1, 2, 3, 4, 5, 6, 0];
            double_bridge(&mut path, &mut rng);
            assert_eq!((path[0], path[7]), (0, 0));
            let mut ids = path[1..7].to_vec();
            ids.sort_unstable();
            assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        }
    }

    #[test]
    fn test_short_paths_untouched() {
        let dm = ring(4);
        let mut path = vec![0, 2, 1, 0];
        let outcome = deep_search(
            &mut path,
            &dm,
            &DeepSearchConfig::default(),
            &mut ChaCha8Rng::seed_from_u64(0),
        );
        assert_eq!(outcome.iterations, 0);
        assert_eq!(path, vec![0, 2, 1, 0]);
    }

    #[test]
    fn test_same_seed_same_result() {
        let dm = ring(14);
        let config = DeepSearchConfig::default()
            .with_max_iterations(300)
            .with_max_duration(Duration::from_secs(30));
        let mut a = scrambled(14);
        let mut b = scrambled(14);
        deep_search(&mut a, &dm, &config, &mut ChaCha8Rng::seed_from_u64(4));
        deep_search(&mut b, &dm, &config, &mut ChaCha8Rng::seed_from_u64(4));
        assert_eq!(a, b);
    }
}
