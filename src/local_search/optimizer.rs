//! Per-route improvement pipeline.

use std::fmt;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::distance::DistanceMatrix;
use crate::models::Route;

use super::{deep_search, three_opt, two_opt, DeepSearchOutcome};

/// Stage of the per-route pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    TwoOpt,
    BoundedThreeOpt,
    ThreeOpt,
    DeepSearch,
    /// Recorded only for routes the inter-route stage changed.
    InterRoute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::TwoOpt => "2-opt",
            Stage::BoundedThreeOpt => "3-opt (bounded)",
            Stage::ThreeOpt => "3-opt",
            Stage::DeepSearch => "deep search",
            Stage::InterRoute => "inter-route",
        })
    }
}

/// Fitness of one route before and after each stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteTrace {
    pub vehicle_id: usize,
    pub initial: f64,
    pub stages: Vec<(Stage, f64)>,
    pub deep_search: Option<DeepSearchOutcome>,
}

impl RouteTrace {
    /// Fitness after the last stage.
    pub fn final_fitness(&self) -> f64 {
        self.stages.last().map_or(self.initial, |&(_, f)| f)
    }
}

/// Runs 2-opt, bounded 3-opt, unbounded 3-opt and the deep search on one
/// route, refreshing its cached fitness after every stage.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_cvrp::config::OptimizerConfig;
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::evaluation::RouteEvaluator;
/// use u_cvrp::local_search::RouteOptimizer;
/// use u_cvrp::models::{Instance, Node, Vehicle};
///
/// let xs = [0.0_f64, 1.0, 2.0, 3.0, 4.0];
/// let nodes: Vec<Node> = (0..5)
///     .map(|i| if i == 0 { Node::depot(0.0, 0.0) } else { Node::new(i, 1, 0.0, xs[i]) })
///     .collect();
/// let dm = DistanceMatrix::from_fn(5, |i, j| (xs[i] - xs[j]).abs());
/// let instance = Instance::new(nodes, vec![Vehicle::new(0, 10)], dm).unwrap();
///
/// let mut route = RouteEvaluator::new(&instance).build_route(0, &[3, 1, 4, 2]).unwrap();
/// let config = OptimizerConfig::default();
/// let optimizer = RouteOptimizer::new(instance.distances(), &config);
/// let trace = optimizer.optimize(&mut route, &mut ChaCha8Rng::seed_from_u64(0));
///
/// assert!((route.fitness() - 8.0).abs() < 1e-9);
/// assert_eq!(trace.stages.len(), 4);
/// ```
pub struct RouteOptimizer<'a> {
    distances: &'a DistanceMatrix,
    config: &'a OptimizerConfig,
}

impl<'a> RouteOptimizer<'a> {
    /// Creates an optimizer over a shared matrix.
    pub fn new(distances: &'a DistanceMatrix, config: &'a OptimizerConfig) -> Self {
        Self { distances, config }
    }

    /// Improves `route` in place. Endpoints, load and client set are
    /// unchanged; fitness never increases.
    pub fn optimize<R: Rng>(&self, route: &mut Route, rng: &mut R) -> RouteTrace {
        let dm = self.distances;
        let mut trace = RouteTrace {
            vehicle_id: route.vehicle_id(),
            initial: route.fitness(),
            stages: Vec::with_capacity(4),
            deep_search: None,
        };

        two_opt(route.path_mut(), dm);
        self.record(route, Stage::TwoOpt, &mut trace);

        three_opt(route.path_mut(), dm, Some(self.config.three_opt_window));
        self.record(route, Stage::BoundedThreeOpt, &mut trace);

        three_opt(route.path_mut(), dm, None);
        self.record(route, Stage::ThreeOpt, &mut trace);

        let outcome = deep_search(route.path_mut(), dm, &self.config.deep_search, rng);
        self.record(route, Stage::DeepSearch, &mut trace);
        debug!(
            vehicle = route.vehicle_id(),
            iterations = outcome.iterations,
            kicks = outcome.kicks,
            stop = ?outcome.stop,
            "deep search finished"
        );
        trace.deep_search = Some(outcome);

        trace
    }

    fn record(&self, route: &mut Route, stage: Stage, trace: &mut RouteTrace) {
        let fitness = route.recompute_fitness(self.distances);
        debug!(vehicle = route.vehicle_id(), %stage, fitness, "stage finished");
        trace.stages.push((stage, fitness));
    }
}
