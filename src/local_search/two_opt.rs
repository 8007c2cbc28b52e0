//! Intra-route 2-opt improvement.
//!
//! # Algorithm
//!
//! For each pair of non-adjacent edges (p[i], p[i+1]) and (p[j], p[j+1]) of
//! a closed path, compute the change in distance from reversing the segment
//! between them:
//!
//! ```text
//! delta = d(p[i], p[j]) + d(p[i+1], p[j+1]) - d(p[i], p[i+1]) - d(p[j], p[j+1])
//! ```
//!
//! If delta is negative, reverse p[i+1..=j] and restart the scan from the
//! first position. Stop when a full scan finds nothing.
//!
//! # Complexity
//!
//! O(n²) per pass, O(n³) worst case for convergence.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use crate::distance::DistanceMatrix;

use super::IMPROVEMENT_EPSILON;

/// Applies 2-opt to a closed path in place and returns the distance saved.
///
/// The first and last entries (the depot) never move. The returned gain is
/// never negative.
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::local_search::two_opt;
///
/// let xs = [0.0_f64, 1.0, 2.0, 3.0];
/// let dm = DistanceMatrix::from_fn(4, |i, j| (xs[i] - xs[j]).abs());
///
/// let mut path = vec![0, 2, 1, 3, 0];
/// let gain = two_opt(&mut path, &dm);
/// assert_eq!(path, vec![0, 1, 2, 3, 0]);
/// assert!((gain - 2.0).abs() < 1e-10);
/// ```
pub fn two_opt(path: &mut [usize], distances: &DistanceMatrix) -> f64 {
    let m = path.len();
    if m < 5 {
        return 0.0;
    }

    let mut total = 0.0;
    'scan: loop {
        for i in 0..m - 3 {
            for j in (i + 2)..m - 1 {
                let delta = two_opt_delta(path, distances, i, j);
                if delta < -IMPROVEMENT_EPSILON {
                    path[i + 1..=j].reverse();
                    total -= delta;
                    continue 'scan;
                }
            }
        }
        break;
    }
    total
}

/// Distance change from reversing `path[i+1..=j]`.
pub(crate) fn two_opt_delta(path: &[usize], distances: &DistanceMatrix, i: usize, j: usize) -> f64 {
    let (a, b) = (path[i], path[i + 1]);
    let (c, d) = (path[j], path[j + 1]);
    distances.get(a, c) + distances.get(b, d) - distances.get(a, b) - distances.get(c, d)
}
