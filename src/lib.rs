//! # u-cvrp
//!
//! Multistart solver for the capacitated vehicle routing problem: several
//! construction strategies produce capacity-feasible routes, each route is
//! improved by 2-opt, 3-opt and a budgeted Lin–Kernighan style search, and
//! the best attempt wins.
//!
//! ## Modules
//!
//! - [`models`]: Domain model types (Node, Vehicle, Route, Instance, Solution)
//! - [`distance`]: Distance matrix
//! - [`evaluation`]: Route building and invariant auditing
//! - [`constructive`]: Construction strategies (Ward clustering, k-means, nearest neighbour)
//! - [`local_search`]: Intra-route operators, route optimizer, inter-route stage
//! - [`solver`]: Individual attempts and the multistart Population driver
//! - [`config`]: Serde-friendly configuration with builder methods
//! - [`error`]: Error type
//!
//! ## Example
//!
//! ```
//! use u_cvrp::config::SolverConfig;
//! use u_cvrp::distance::DistanceMatrix;
//! use u_cvrp::models::{Instance, Node, Vehicle};
//! use u_cvrp::solver::Population;
//!
//! let nodes = vec![
//!     Node::depot(40.0, -3.7),
//!     Node::new(1, 3, 40.01, -3.69),
//!     Node::new(2, 4, 40.02, -3.68),
//!     Node::new(3, 2, 39.99, -3.71),
//!     Node::new(4, 5, 39.98, -3.72),
//! ];
//! let distances = DistanceMatrix::from_nodes(&nodes);
//! let vehicles = vec![Vehicle::new(0, 7), Vehicle::new(1, 7)];
//! let instance = Instance::new(nodes, vehicles, distances)?;
//!
//! let config = SolverConfig::default().with_population_size(4);
//! let report = Population::new(&instance, &config)?.run()?;
//! let solution = report.solution();
//! assert_eq!(solution.num_served(), 4);
//! # Ok::<(), u_cvrp::CvrpError>(())
//! ```

pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod solver;

pub use error::CvrpError;
