//! Multistart solving.
//!
//! - [`Individual`]: One attempt: construction, route building, per-route
//!   local search, inter-route stage
//! - [`Population`]: Runs independent attempts (optionally on the rayon
//!   pool) and keeps the minimum-fitness individual

mod individual;
mod population;

pub use individual::Individual;
pub use population::{AttemptRecord, Population, SolveReport};
