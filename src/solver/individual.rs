//! One solve attempt: construct, build routes, optimize each route.

use rand::Rng;
use tracing::debug;

use crate::config::SolverConfig;
use crate::constructive::{RouteConstructor, Strategy};
use crate::error::CvrpError;
use crate::evaluation::RouteEvaluator;
use crate::local_search::{RouteOptimizer, RouteTrace, Stage, IMPROVEMENT_EPSILON};
use crate::models::{Instance, Route, RouteSummary, Solution, Violation};

/// Result of one construction-plus-improvement attempt.
///
/// Holds one closed route per vehicle that serves at least one client;
/// `fitness` is the sum of the route fitness values.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_cvrp::config::SolverConfig;
/// use u_cvrp::constructive::Strategy;
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::models::{Instance, Node, Vehicle};
/// use u_cvrp::solver::Individual;
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0),
///     Node::new(1, 3, 0.0, 0.01),
///     Node::new(2, 4, 0.0, 0.02),
///     Node::new(3, 2, 0.0, -0.01),
///     Node::new(4, 5, 0.0, -0.02),
/// ];
/// let dm = DistanceMatrix::from_nodes(&nodes);
/// let instance = Instance::new(nodes, vec![Vehicle::new(0, 7), Vehicle::new(1, 7)], dm).unwrap();
///
/// let config = SolverConfig::default();
/// let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
/// let individual = Individual::solve(&instance, &config, Strategy::NearestNeighbor, &mut rng).unwrap();
///
/// assert_eq!(individual.routes().len(), 2);
/// assert!(individual.is_feasible(&instance));
/// ```
#[derive(Debug, Clone)]
pub struct Individual {
    strategy: Strategy,
    routes: Vec<Route>,
    fitness: f64,
    traces: Vec<RouteTrace>,
}

impl Individual {
    /// Runs one attempt with the given strategy.
    ///
    /// Construction errors end the attempt; local search never fails.
    pub fn solve<R: Rng>(
        instance: &Instance,
        config: &SolverConfig,
        strategy: Strategy,
        rng: &mut R,
    ) -> Result<Self, CvrpError> {
        let assignment =
            RouteConstructor::new(instance, &config.construction).construct(strategy, rng)?;

        let evaluator = RouteEvaluator::new(instance);
        let mut routes = assignment
            .iter()
            .filter(|(_, clients)| !clients.is_empty())
            .map(|(&vehicle_id, clients)| evaluator.build_route(vehicle_id, clients))
            .collect::<Result<Vec<_>, _>>()?;

        let optimizer = RouteOptimizer::new(instance.distances(), &config.optimizer);
        let traces: Vec<RouteTrace> = routes
            .iter_mut()
            .map(|route| optimizer.optimize(route, rng))
            .collect();

        let inter_route = config.optimizer.inter_route.improver();
        let saved = inter_route.improve(instance, &mut routes)?;
        if saved > 0.0 {
            debug!(stage = inter_route.name(), saved, "inter-route stage improved routes");
        }
        let (routes, traces) = settle_inter_route(routes, traces);

        let fitness = routes.iter().map(Route::fitness).sum();
        debug!(strategy = %strategy, routes = routes.len(), fitness, "attempt finished");
        Ok(Self {
            strategy,
            routes,
            fitness,
            traces,
        })
    }

    /// Strategy that produced the initial routes.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Routes ordered by vehicle id. Unused vehicles have no route.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Sum of route fitness values.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Per-route stage fitness, in route order.
    pub fn traces(&self) -> &[RouteTrace] {
        &self.traces
    }

    /// Every invariant this individual breaks against `instance`.
    pub fn violations(&self, instance: &Instance) -> Vec<Violation> {
        RouteEvaluator::new(instance).audit(&self.routes)
    }

    /// Returns `true` if every client is served exactly once within capacity.
    pub fn is_feasible(&self, instance: &Instance) -> bool {
        self.violations(instance).is_empty()
    }

    /// Flattens the individual into the output contract.
    pub fn to_solution(&self) -> Solution {
        Solution::new(
            self.routes
                .iter()
                .map(|r| RouteSummary {
                    vehicle_id: r.vehicle_id(),
                    nodes: r.nodes().to_vec(),
                    distance: r.fitness(),
                    load: r.load(),
                })
                .collect(),
        )
    }
}

/// Drops routes the inter-route stage emptied and records the new fitness
/// on the traces of routes it changed.
fn settle_inter_route(routes: Vec<Route>, traces: Vec<RouteTrace>) -> (Vec<Route>, Vec<RouteTrace>) {
    routes
        .into_iter()
        .zip(traces)
        .filter(|(route, _)| !route.is_empty())
        .map(|(route, mut trace)| {
            if (trace.final_fitness() - route.fitness()).abs() > IMPROVEMENT_EPSILON {
                trace.stages.push((Stage::InterRoute, route.fitness()));
            }
            (route, trace)
        })
        .unzip()
}
