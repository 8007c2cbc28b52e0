//! Distance matrix.
//!
//! The solver consumes a precomputed, read-only matrix indexed by node id.

mod matrix;

pub use matrix::DistanceMatrix;
