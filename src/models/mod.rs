//! Domain model types for the capacitated vehicle routing problem.
//!
//! Nodes and vehicles are immutable instance data; routes are ordered node
//! sequences with cached load and distance; [`Instance`] bundles everything
//! with the distance matrix; [`Solution`] is the read-only output view.

mod instance;
mod node;
mod route;
mod solution;
mod vehicle;

pub use instance::Instance;
pub use node::{Node, TimeWindow, EARTH_RADIUS_KM};
pub use route::Route;
pub use solution::{RouteSummary, Solution, Violation};
pub use vehicle::Vehicle;
