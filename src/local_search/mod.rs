//! Local search for improving routes.
//!
//! Intra-route operators work on a closed path (depot at both ends) in place
//! and return the distance they saved:
//!
//! - [`two_opt`]: Segment reversal, restarting after each improvement
//! - [`three_opt`]: First-improvement 3-opt with an optional window
//! - [`deep_search`]: Budgeted Lin–Kernighan style chains with kicks
//!
//! [`RouteOptimizer`] runs them in that order on one route. Across routes,
//! an [`InterRouteImprover`] runs afterwards.

mod inter_route;
mod lin_kernighan;
mod optimizer;
mod three_opt;
mod two_opt;

pub use inter_route::{InterRouteImprover, InterRouteMode, NoInterRoute, RelocateImprover};
pub use lin_kernighan::{deep_search, DeepSearchOutcome, StopReason};
pub use optimizer::{RouteOptimizer, RouteTrace, Stage};
pub use three_opt::three_opt;
pub use two_opt::two_opt;

/// Smallest distance change treated as an improvement.
pub const IMPROVEMENT_EPSILON: f64 = 1e-10;
