//! Inter-route improvement stage.
//!
//! Routes are optimized independently, then handed together to an
//! [`InterRouteImprover`]. The default, [`NoInterRoute`], leaves them as they
//! are; [`RelocateImprover`] moves single clients between routes.

use serde::{Deserialize, Serialize};

use crate::error::CvrpError;
use crate::evaluation::RouteEvaluator;
use crate::models::{Instance, Route};

use super::IMPROVEMENT_EPSILON;

/// Improvement stage that may move clients between routes.
///
/// Implementations must keep every route closed, within capacity, and with
/// fresh cached load and fitness. A route may be left without clients; the
/// caller drops it. The return value is the distance saved.
pub trait InterRouteImprover: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Improves `routes` in place.
    fn improve(&self, instance: &Instance, routes: &mut [Route]) -> Result<f64, CvrpError>;
}

/// Selects the inter-route stage from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterRouteMode {
    /// No inter-route moves.
    #[default]
    Disabled,
    /// Best-improvement single-client relocation.
    Relocate,
}

impl InterRouteMode {
    /// Builds the configured stage.
    pub fn improver(self) -> Box<dyn InterRouteImprover> {
        match self {
            InterRouteMode::Disabled => Box::new(NoInterRoute),
            InterRouteMode::Relocate => Box::new(RelocateImprover),
        }
    }
}

/// Leaves routes untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterRoute;

impl InterRouteImprover for NoInterRoute {
    fn name(&self) -> &'static str {
        "none"
    }

    fn improve(&self, _instance: &Instance, _routes: &mut [Route]) -> Result<f64, CvrpError> {
        Ok(0.0)
    }
}

/// Moves one client at a time to the cheapest position in another route
/// with spare capacity, always taking the best move, until none improves.
///
/// # Complexity
///
/// O(n² × R) per move where n = clients per route, R = number of routes.
///
/// # Reference
///
/// Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
/// Relation to the Logistics of Blood Banking". PhD thesis.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelocateImprover;

#[derive(Debug, Clone, Copy)]
struct RelocateMove {
    from_route: usize,
    from_pos: usize,
    to_route: usize,
    to_pos: usize,
    delta: f64,
}

impl InterRouteImprover for RelocateImprover {
    fn name(&self) -> &'static str {
        "relocate"
    }

    fn improve(&self, instance: &Instance, routes: &mut [Route]) -> Result<f64, CvrpError> {
        if routes.len() < 2 {
            return Ok(0.0);
        }
        let mut clients: Vec<Vec<usize>> = routes.iter().map(Route::client_ids).collect();
        let mut loads: Vec<i32> = routes.iter().map(Route::load).collect();
        let capacities: Vec<i32> = routes
            .iter()
            .map(|r| instance.vehicle(r.vehicle_id()).map_or(0, |v| v.capacity()))
            .collect();

        let mut saved = 0.0;
        let mut changed = vec![false; routes.len()];
        while let Some(mv) = find_best_relocate(instance, &clients, &loads, &capacities) {
            let client = clients[mv.from_route].remove(mv.from_pos);
            clients[mv.to_route].insert(mv.to_pos, client);
            let demand = instance.demand(client);
            loads[mv.from_route] -= demand;
            loads[mv.to_route] += demand;
            changed[mv.from_route] = true;
            changed[mv.to_route] = true;
            saved -= mv.delta;
        }

        let evaluator = RouteEvaluator::new(instance);
        for (idx, route) in routes.iter_mut().enumerate() {
            if changed[idx] {
                *route = evaluator.build_route(route.vehicle_id(), &clients[idx])?;
            }
        }
        Ok(saved)
    }
}

fn find_best_relocate(
    instance: &Instance,
    routes: &[Vec<usize>],
    loads: &[i32],
    capacities: &[i32],
) -> Option<RelocateMove> {
    let distances = instance.distances();
    let mut best: Option<RelocateMove> = None;

    for (from_r, from) in routes.iter().enumerate() {
        for (from_pos, &client) in from.iter().enumerate() {
            let prev = if from_pos == 0 { 0 } else { from[from_pos - 1] };
            let next = from.get(from_pos + 1).copied().unwrap_or(0);
            let removal = distances.get(prev, next)
                - distances.get(prev, client)
                - distances.get(client, next);
            let demand = instance.demand(client);

            for (to_r, to) in routes.iter().enumerate() {
                if to_r == from_r || loads[to_r] + demand > capacities[to_r] {
                    continue;
                }
                for to_pos in 0..=to.len() {
                    let before = if to_pos == 0 { 0 } else { to[to_pos - 1] };
                    let after = to.get(to_pos).copied().unwrap_or(0);
                    let insertion = distances.get(before, client) + distances.get(client, after)
                        - distances.get(before, after);
                    let delta = removal + insertion;
                    if delta < -IMPROVEMENT_EPSILON && best.map_or(true, |b| delta < b.delta) {
                        best = Some(RelocateMove {
                            from_route: from_r,
                            from_pos,
                            to_route: to_r,
                            to_pos,
                            delta,
                        });
                    }
                }
            }
        }
    }
    best
}
