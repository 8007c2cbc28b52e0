//! Intra-route 3-opt improvement, first improvement.
//!
//! # Algorithm
//!
//! Three cut edges (p[i], p[i+1]), (p[j], p[j+1]) and (p[k], p[k+1]) split a
//! closed path into `A = p[..=i]`, `B = p[i+1..=j]`, `C = p[j+1..=k]` and
//! `D = p[k+1..]`. Of the eight ways to reconnect B and C between A and D,
//! the identity is excluded, leaving seven candidates (2-opt moves are the
//! special cases that reverse only one segment).
//!
//! The scan stops at the first triple with an improving reconnection,
//! applies the best of its seven patterns, and starts over from the first
//! position. An optional window bounds `k - i`, which keeps each pass close
//! to linear on long routes.
//!
//! # Complexity
//!
//! O(n·w²) per pass with window w, O(n³) unbounded.
//!
//! # Reference
//!
//! Lin, S. (1965). "Computer Solutions of the Traveling Salesman Problem",
//! *Bell System Technical Journal* 44(10), 2245-2269.

use crate::distance::DistanceMatrix;

use super::IMPROVEMENT_EPSILON;

/// Reconnection of segments B and C between A and D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconnection {
    /// A B C' D
    ReverseC,
    /// A B' C D
    ReverseB,
    /// A B' C' D
    ReverseBoth,
    /// A C B D
    Swap,
    /// A C B' D
    SwapReverseB,
    /// A C' B D
    SwapReverseC,
    /// A C' B' D
    SwapReverseBoth,
}

impl Reconnection {
    const ALL: [Reconnection; 7] = [
        Reconnection::ReverseC,
        Reconnection::ReverseB,
        Reconnection::ReverseBoth,
        Reconnection::Swap,
        Reconnection::SwapReverseB,
        Reconnection::SwapReverseC,
        Reconnection::SwapReverseBoth,
    ];

    /// The three new edges, given the segment endpoints.
    fn edges(self, a: usize, b1: usize, b2: usize, c1: usize, c2: usize, d: usize) -> [(usize, usize); 3] {
        match self {
            Reconnection::ReverseC => [(a, b1), (b2, c2), (c1, d)],
            Reconnection::ReverseB => [(a, b2), (b1, c1), (c2, d)],
            Reconnection::ReverseBoth => [(a, b2), (b1, c2), (c1, d)],
            Reconnection::Swap => [(a, c1), (c2, b1), (b2, d)],
            Reconnection::SwapReverseB => [(a, c1), (c2, b2), (b1, d)],
            Reconnection::SwapReverseC => [(a, c2), (c1, b1), (b2, d)],
            Reconnection::SwapReverseBoth => [(a, c2), (c1, b2), (b1, d)],
        }
    }
}

/// Applies first-improvement 3-opt to a closed path in place and returns the
/// distance saved.
///
/// With `window = Some(w)` only triples with `k - i <= w` are examined.
/// The first and last entries never move and the returned gain is never
/// negative.
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::local_search::three_opt;
///
/// let pts = [(0.0_f64, 0.0_f64), (1.0, 0.0), (2.0, 1.0), (3.0, 0.0), (2.0, -1.0)];
/// let dm = DistanceMatrix::from_fn(5, |i, j| {
///     let (dx, dy) = (pts[i].0 - pts[j].0, pts[i].1 - pts[j].1);
///     (dx * dx + dy * dy).sqrt()
/// });
///
/// let mut path = vec![0, 1, 3, 2, 4, 0];
/// let before = dm.path_distance(&path);
/// let gain = three_opt(&mut path, &dm, Some(10));
/// assert!(gain > 0.0);
/// assert!((dm.path_distance(&path) - (before - gain)).abs() < 1e-9);
/// ```
pub fn three_opt(path: &mut [usize], distances: &DistanceMatrix, window: Option<usize>) -> f64 {
    let m = path.len();
    if m < 5 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut buffer = Vec::with_capacity(m);
    'scan: loop {
        for i in 0..m - 3 {
            let k_max = window.map_or(m - 2, |w| (i + w).min(m - 2));
            for j in (i + 1)..k_max {
                for k in (j + 1)..=k_max {
                    if let Some((pattern, delta)) = best_reconnection(path, distances, i, j, k) {
                        apply(path, &mut buffer, pattern, i, j, k);
                        total -= delta;
                        continue 'scan;
                    }
                }
            }
        }
        break;
    }
    total
}

/// Most improving reconnection for cuts after positions `i < j < k`, if any
/// improves.
fn best_reconnection(
    path: &[usize],
    distances: &DistanceMatrix,
    i: usize,
    j: usize,
    k: usize,
) -> Option<(Reconnection, f64)> {
    let (a, b1, b2) = (path[i], path[i + 1], path[j]);
    let (c1, c2, d) = (path[j + 1], path[k], path[k + 1]);
    let old = distances.get(a, b1) + distances.get(b2, c1) + distances.get(c2, d);

    let mut best: Option<(Reconnection, f64)> = None;
    for pattern in Reconnection::ALL {
        let new: f64 = pattern
            .edges(a, b1, b2, c1, c2, d)
            .iter()
            .map(|&(u, v)| distances.get(u, v))
            .sum();
        let delta = new - old;
        if delta < -IMPROVEMENT_EPSILON && best.map_or(true, |(_, bd)| delta < bd) {
            best = Some((pattern, delta));
        }
    }
    best
}

/// Rewrites `path[i+1..=k]` according to `pattern`.
fn apply(
    path: &mut [usize],
    buffer: &mut Vec<usize>,
    pattern: Reconnection,
    i: usize,
    j: usize,
    k: usize,
) {
    let b = i + 1..=j;
    let c = j + 1..=k;
    buffer.clear();
    match pattern {
        Reconnection::ReverseC => {
            buffer.extend_from_slice(&path[b]);
            buffer.extend(path[c].iter().rev());
        }
        Reconnection::ReverseB => {
            buffer.extend(path[b].iter().rev());
            buffer.extend_from_slice(&path[c]);
        }
        Reconnection::ReverseBoth => {
            buffer.extend(path[b].iter().rev());
            buffer.extend(path[c].iter().rev());
        }
        Reconnection::Swap => {
            buffer.extend_from_slice(&path[c]);
            buffer.extend_from_slice(&path[b]);
        }
        Reconnection::SwapReverseB => {
            buffer.extend_from_slice(&path[c]);
            buffer.extend(path[b].iter().rev());
        }
        Reconnection::SwapReverseC => {
            buffer.extend(path[c].iter().rev());
            buffer.extend_from_slice(&path[b]);
        }
        Reconnection::SwapReverseBoth => {
            buffer.extend(path[c].iter().rev());
            buffer.extend(path[b].iter().rev());
        }
    }
    path[i + 1..=k].copy_from_slice(buffer);
}
