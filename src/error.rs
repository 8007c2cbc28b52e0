//! Error type shared by construction, instance validation, and the
//! multistart driver.
//!
//! Local search never fails: it stops at a local optimum or at its budget.

use thiserror::Error;

use crate::constructive::Strategy;

/// Errors produced while validating an instance or building a solution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CvrpError {
    /// The fleet is larger than the client set.
    #[error("instance has {vehicles} vehicles but only {clients} clients")]
    TooManyVehicles {
        /// Number of vehicles.
        vehicles: usize,
        /// Number of clients (depot excluded).
        clients: usize,
    },

    /// A single client needs more than the largest vehicle can carry.
    #[error("client {client} has demand {demand}, above every vehicle capacity (max {max_capacity})")]
    DemandExceedsCapacity {
        /// Client node id.
        client: usize,
        /// Demand of the client.
        demand: i32,
        /// Largest capacity in the fleet.
        max_capacity: i32,
    },

    /// Clustering construction found no vehicle with room left for a client.
    #[error("no vehicle has remaining capacity for client {client} (demand {demand})")]
    NoCapacityForClient {
        /// Client node id.
        client: usize,
        /// Demand of the client.
        demand: i32,
    },

    /// Greedy construction ran out of vehicles before serving every client.
    #[error("{count} clients left unassigned after exhausting all vehicles: {clients:?}", count = .clients.len())]
    UnassignedClients {
        /// Client node ids that could not be placed.
        clients: Vec<usize>,
    },

    /// A route was built whose load exceeds its vehicle capacity.
    #[error("route for vehicle {vehicle} carries {load}, capacity is {capacity}")]
    CapacityExceeded {
        /// Vehicle id.
        vehicle: usize,
        /// Load of the route.
        load: i32,
        /// Vehicle capacity.
        capacity: i32,
    },

    /// The distance matrix is not square, symmetric, zero-diagonal and
    /// nonnegative.
    #[error("invalid distance matrix: {0}")]
    InvalidMatrix(String),

    /// Nodes or vehicles are inconsistent with each other or the matrix.
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// Solver configuration rejected by [`SolverConfig::validate`](crate::config::SolverConfig::validate).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The strategy needs a cargo feature that was not compiled in.
    #[error("construction strategy `{0}` is not available in this build")]
    StrategyUnavailable(Strategy),

    /// The external VRP solver failed or returned an unusable plan.
    #[error("external solver failed: {0}")]
    ExternalSolver(String),

    /// Every multistart attempt failed.
    #[error("all {attempts} attempts failed; last error: {last}")]
    NoFeasibleAttempt {
        /// Number of attempts run.
        attempts: usize,
        /// Error of the last failed attempt.
        last: Box<CvrpError>,
    },
}
