//! Dense distance matrix.

use crate::error::CvrpError;
use crate::models::Node;

/// A dense n×n distance matrix stored in row-major order, indexed by node id.
///
/// The solver treats it as read-only: square, symmetric, zero on the
/// diagonal, nonnegative. [`DistanceMatrix::validate`] checks those
/// properties; [`Instance::new`](crate::models::Instance::new) calls it.
///
/// # Examples
///
/// ```
/// use u_cvrp::distance::DistanceMatrix;
///
/// let dm = DistanceMatrix::from_fn(3, |i, j| (i as f64 - j as f64).abs());
/// assert_eq!(dm.get(0, 2), 2.0);
/// assert_eq!(dm.size(), 3);
/// assert!(dm.validate().is_ok());
/// assert_eq!(dm.path_distance(&[0, 2, 1, 0]), 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Tolerance used when checking symmetry.
    pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a great-circle distance matrix (kilometres) from node
    /// coordinates.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let n = nodes.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = nodes[i].distance_to(&nodes[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Builds a matrix by evaluating `f(i, j)` for every pair.
    pub fn from_fn(size: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut dm = Self::new(size);
        for i in 0..size {
            for j in 0..size {
                dm.set(i, j, f(i, j));
            }
        }
        dm
    }

    /// Creates a distance matrix from an explicit row-major n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Creates a distance matrix from nested rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, CvrpError> {
        let size = rows.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(CvrpError::InvalidMatrix(format!(
                "row {idx} has {} entries, expected {size}",
                row.len()
            )));
        }
        Ok(Self {
            data: rows.concat(),
            size,
        })
    }

    /// Returns the distance from node `from` to node `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from node `from` to node `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of nodes in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Checks that every entry is finite and nonnegative, the diagonal is
    /// zero, and the matrix is symmetric.
    pub fn validate(&self) -> Result<(), CvrpError> {
        for i in 0..self.size {
            if self.get(i, i) != 0.0 {
                return Err(CvrpError::InvalidMatrix(format!(
                    "diagonal entry ({i}, {i}) is {}",
                    self.get(i, i)
                )));
            }
            for j in 0..self.size {
                let d = self.get(i, j);
                if !d.is_finite() || d < 0.0 {
                    return Err(CvrpError::InvalidMatrix(format!(
                        "entry ({i}, {j}) is {d}"
                    )));
                }
            }
        }
        if !self.is_symmetric(Self::SYMMETRY_TOLERANCE) {
            return Err(CvrpError::InvalidMatrix("matrix is not symmetric".into()));
        }
        Ok(())
    }

    /// Sum of consecutive lookups along a node sequence.
    pub fn path_distance(&self, path: &[usize]) -> f64 {
        path.windows(2).map(|w| self.get(w[0], w[1])).sum()
    }

    /// Returns the nearest candidate to `from`, the lowest id winning ties.
    ///
    /// Returns `None` if `candidates` is empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates.iter().copied().min_by(|&a, &b| {
            self.get(from, a)
                .total_cmp(&self.get(from, b))
                .then(a.cmp(&b))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::depot(0.0, 0.0),
            Node::new(1, 10, 0.0, 1.0),
            Node::new(2, 20, 0.0, 2.0),
        ]
    }

    #[test]
    fn test_from_nodes() {
        let dm = DistanceMatrix::from_nodes(&sample_nodes());
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1) - 111.195).abs() < 0.05);
        assert!((dm.get(0, 2) - 2.0 * dm.get(0, 1)).abs() < 1e-6);
        assert_eq!(dm.get(1, 1), 0.0);
        assert!(dm.validate().is_ok());
    }

    #[test]
    fn test_from_data() {
        let dm = DistanceMatrix::from_data(2, vec![0.0, 5.0, 5.0, 0.0]).expect("valid");
        assert_eq!(dm.get(0, 1), 5.0);
        assert_eq!(dm.get(1, 0), 5.0);
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_none());
    }

    #[test]
    fn test_from_rows() {
        let dm = DistanceMatrix::from_rows(&[vec![0.0, 3.0], vec![3.0, 0.0]]).expect("square");
        assert_eq!(dm.get(1, 0), 3.0);
        assert!(matches!(
            DistanceMatrix::from_rows(&[vec![0.0, 3.0], vec![3.0]]),
            Err(CvrpError::InvalidMatrix(_))
        ));
    }

    #[test]
    fn test_validate_rejects_asymmetric() {
        let mut dm = DistanceMatrix::new(2);
        dm.set(0, 1, 10.0);
        dm.set(1, 0, 15.0);
        assert!(!dm.is_symmetric(1e-10));
        assert!(matches!(dm.validate(), Err(CvrpError::InvalidMatrix(_))));
    }

    #[test]
    fn test_validate_rejects_negative_and_diagonal() {
        let mut dm = DistanceMatrix::new(2);
        dm.set(0, 1, -1.0);
        dm.set(1, 0, -1.0);
        assert!(dm.validate().is_err());

        let mut dm = DistanceMatrix::new(2);
        dm.set(1, 1, 0.5);
        assert!(dm.validate().is_err());

        let mut dm = DistanceMatrix::new(2);
        dm.set(0, 1, f64::NAN);
        dm.set(1, 0, f64::NAN);
        assert!(dm.validate().is_err());
    }

    #[test]
    fn test_path_distance() {
        let dm = DistanceMatrix::from_fn(4, |i, j| (i as f64 - j as f64).abs());
        assert_eq!(dm.path_distance(&[0, 1, 2, 3, 0]), 6.0);
        assert_eq!(dm.path_distance(&[0, 0]), 0.0);
        assert_eq!(dm.path_distance(&[]), 0.0);
    }

    #[test]
    fn test_nearest_neighbor_ties_to_lowest_id() {
        let dm = DistanceMatrix::from_fn(4, |i, j| if i == j { 0.0 } else { 1.0 });
        assert_eq!(dm.nearest_neighbor(0, &[3, 2, 1]), Some(1));
        assert_eq!(dm.nearest_neighbor(0, &[]), None);

        let dm = DistanceMatrix::from_nodes(&sample_nodes());
        assert_eq!(dm.nearest_neighbor(0, &[2, 1]), Some(1));
    }
}
