//! Solver configuration.
//!
//! Every struct derives serde with `#[serde(default)]`, so a partial
//! document only overrides the fields it names. Reading the document from
//! disk is left to the embedding application.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constructive::Strategy;
use crate::error::CvrpError;
use crate::local_search::InterRouteMode;

/// Parameters of the construction strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionConfig {
    /// Maximum Lloyd iterations of the k-means partitioning.
    pub kmeans_max_iterations: usize,
    /// Largest hop (in distance-matrix units) the compactness-bounded greedy
    /// accepts from the current route tail.
    pub compactness_threshold: f64,
    /// Wall-clock budget handed to the external solver, in seconds.
    pub external_max_time_secs: usize,
    /// Optional generation cap for the external solver.
    pub external_max_generations: Option<usize>,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            kmeans_max_iterations: 100,
            compactness_threshold: 50.0,
            external_max_time_secs: 5,
            external_max_generations: None,
        }
    }
}

impl ConstructionConfig {
    /// Sets the k-means iteration cap.
    pub fn with_kmeans_max_iterations(mut self, n: usize) -> Self {
        self.kmeans_max_iterations = n;
        self
    }

    /// Sets the compactness threshold.
    pub fn with_compactness_threshold(mut self, threshold: f64) -> Self {
        self.compactness_threshold = threshold;
        self
    }

    /// Sets the external solver time budget.
    pub fn with_external_max_time_secs(mut self, secs: usize) -> Self {
        self.external_max_time_secs = secs;
        self
    }
}

/// Budget of the LK-style deep edge-exchange search.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_cvrp::config::DeepSearchConfig;
///
/// let config = DeepSearchConfig::default()
///     .with_max_iterations(500)
///     .with_max_duration(Duration::from_millis(50));
/// assert_eq!(config.max_iterations, 500);
/// assert_eq!(config.max_duration, Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepSearchConfig {
    /// Maximum number of chain attempts.
    pub max_iterations: usize,
    /// Maximum wall-clock time.
    pub max_duration: Duration,
    /// Maximum number of exchanges in one chain.
    pub max_depth: usize,
    /// Kick the best order with a random double bridge when a sweep finds
    /// nothing, and keep searching while budget remains.
    pub perturb: bool,
}

impl Default for DeepSearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2_000,
            max_duration: Duration::from_secs(2),
            max_depth: 6,
            perturb: true,
        }
    }
}

impl DeepSearchConfig {
    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the wall-clock cap.
    pub fn with_max_duration(mut self, d: Duration) -> Self {
        self.max_duration = d;
        self
    }

    /// Sets the chain depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enables or disables perturbation kicks.
    pub fn with_perturb(mut self, perturb: bool) -> Self {
        self.perturb = perturb;
        self
    }
}

/// Parameters of the per-route improvement pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Largest `k - i` span examined by the bounded 3-opt pass.
    pub three_opt_window: usize,
    /// Deep search budget.
    pub deep_search: DeepSearchConfig,
    /// Stage applied across routes after per-route optimization.
    pub inter_route: InterRouteMode,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            three_opt_window: 10,
            deep_search: DeepSearchConfig::default(),
            inter_route: InterRouteMode::Disabled,
        }
    }
}

impl OptimizerConfig {
    /// Sets the bounded 3-opt window.
    pub fn with_three_opt_window(mut self, window: usize) -> Self {
        self.three_opt_window = window;
        self
    }

    /// Sets the deep search budget.
    pub fn with_deep_search(mut self, deep_search: DeepSearchConfig) -> Self {
        self.deep_search = deep_search;
        self
    }

    /// Sets the inter-route stage.
    pub fn with_inter_route(mut self, mode: InterRouteMode) -> Self {
        self.inter_route = mode;
        self
    }
}

/// Top-level multistart configuration.
///
/// # Examples
///
/// ```
/// use u_cvrp::config::SolverConfig;
/// use u_cvrp::constructive::Strategy;
///
/// let config = SolverConfig::default()
///     .with_population_size(8)
///     .with_seed(7)
///     .with_strategies(vec![Strategy::NearestNeighbor, Strategy::KMeans]);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.strategy_for(3), Strategy::KMeans);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Number of independent attempts.
    pub population_size: usize,
    /// Base seed; attempt `i` uses `seed + i`.
    pub seed: u64,
    /// Strategies cycled through by attempt index.
    pub strategies: Vec<Strategy>,
    /// Run attempts on the rayon thread pool.
    pub parallel: bool,
    /// Construction parameters.
    pub construction: ConstructionConfig,
    /// Improvement parameters.
    pub optimizer: OptimizerConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            seed: 42,
            strategies: vec![
                Strategy::HierarchicalClustering,
                Strategy::KMeans,
                Strategy::NearestNeighbor,
                Strategy::CompactNearestNeighbor,
            ],
            parallel: true,
            construction: ConstructionConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Sets the number of attempts.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the strategy cycle.
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Enables or disables parallel attempts.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the construction parameters.
    pub fn with_construction(mut self, construction: ConstructionConfig) -> Self {
        self.construction = construction;
        self
    }

    /// Sets the improvement parameters.
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Strategy used by the attempt with the given index.
    ///
    /// # Panics
    ///
    /// Panics if the strategy list is empty; [`SolverConfig::validate`]
    /// rejects that case.
    pub fn strategy_for(&self, attempt: usize) -> Strategy {
        self.strategies[attempt % self.strategies.len()]
    }

    /// Seed of the attempt with the given index.
    pub fn seed_for(&self, attempt: usize) -> u64 {
        self.seed.wrapping_add(attempt as u64)
    }

    /// Rejects configurations the driver cannot run.
    pub fn validate(&self) -> Result<(), CvrpError> {
        if self.population_size == 0 {
            return Err(CvrpError::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        if self.strategies.is_empty() {
            return Err(CvrpError::InvalidConfig(
                "at least one construction strategy is required".into(),
            ));
        }
        if self.optimizer.three_opt_window == 0 {
            return Err(CvrpError::InvalidConfig(
                "three_opt_window must be at least 1".into(),
            ));
        }
        let threshold = self.construction.compactness_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(CvrpError::InvalidConfig(format!(
                "compactness_threshold must be positive and finite, got {threshold}"
            )));
        }
        Ok(())
    }
}
