//! Multistart driver.
//!
//! Runs `population_size` independent attempts, each with its own seeded
//! generator and a strategy picked by attempt index, and keeps the one with
//! the lowest fitness. There is no recombination between attempts.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SolverConfig;
use crate::constructive::Strategy;
use crate::error::CvrpError;
use crate::models::{Instance, Solution};

use super::Individual;

/// Outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    /// Attempt index, `0..population_size`.
    pub index: usize,
    /// Construction strategy used.
    pub strategy: Strategy,
    /// Seed of the attempt's generator.
    pub seed: u64,
    /// Total fitness, if the attempt succeeded.
    pub fitness: Option<f64>,
    /// Error message, if the attempt failed.
    pub error: Option<String>,
}

/// Result of a solve session.
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Winning individual.
    pub best: Individual,
    /// Index of the winning attempt.
    pub best_attempt: usize,
    /// Every attempt in index order.
    pub attempts: Vec<AttemptRecord>,
    /// Wall-clock time of the session.
    pub elapsed: Duration,
}

impl SolveReport {
    /// Output contract of the winning individual.
    pub fn solution(&self) -> Solution {
        self.best.to_solution()
    }

    /// Number of attempts that produced an individual.
    pub fn successful_attempts(&self) -> usize {
        self.attempts.iter().filter(|a| a.fitness.is_some()).count()
    }
}

/// Multistart driver over a shared, read-only instance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_cvrp::config::{DeepSearchConfig, OptimizerConfig, SolverConfig};
/// use u_cvrp::distance::DistanceMatrix;
/// use u_cvrp::models::{Instance, Node, Vehicle};
/// use u_cvrp::solver::Population;
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
/// let config = SolverConfig::default()
///     .with_population_size(4)
///     .with_optimizer(OptimizerConfig::default().with_deep_search(
///         DeepSearchConfig::default().with_max_duration(Duration::from_millis(100)),
///     ));
/// let report = Population::new(&instance, &config).unwrap().run().unwrap();
///
/// assert_eq!(report.attempts.len(), 4);
/// let solution = report.solution();
/// assert_eq!(solution.num_served(), 4);
/// assert!(report
///     .attempts
///     .iter()
///     .filter_map(|a| a.fitness)
///     .all(|f| report.best.fitness() <= f));
/// ```
pub struct Population<'a> {
    instance: &'a Instance,
    config: &'a SolverConfig,
}

impl<'a> Population<'a> {
    /// Creates a driver, rejecting invalid configurations.
    pub fn new(instance: &'a Instance, config: &'a SolverConfig) -> Result<Self, CvrpError> {
        config.validate()?;
        Ok(Self { instance, config })
    }

    /// Runs every attempt and returns the best individual.
    ///
    /// Failed attempts are logged and skipped. Fails with
    /// [`CvrpError::NoFeasibleAttempt`] if none succeeds.
    pub fn run(&self) -> Result<SolveReport, CvrpError> {
        let started = Instant::now();
        let n = self.config.population_size;
        info!(
            attempts = n,
            clients = self.instance.num_clients(),
            vehicles = self.instance.vehicles().len(),
            parallel = self.config.parallel,
            "solve session started"
        );

        let outcomes: Vec<(AttemptRecord, Result<Individual, CvrpError>)> = if self.config.parallel {
            (0..n).into_par_iter().map(|i| self.attempt(i)).collect()
        } else {
            (0..n).map(|i| self.attempt(i)).collect()
        };

        let mut attempts = Vec::with_capacity(n);
        let mut best: Option<(usize, Individual)> = None;
        let mut last_error = None;
        for (record, result) in outcomes {
            match result {
                Ok(individual) => {
                    // Strict comparison keeps the lowest index on ties.
                    if best
                        .as_ref()
                        .map_or(true, |(_, b)| individual.fitness() < b.fitness())
                    {
                        best = Some((record.index, individual));
                    }
                }
                Err(e) => last_error = Some(e),
            }
            attempts.push(record);
        }

        let Some((best_attempt, best)) = best else {
            let last = last_error.unwrap_or_else(|| {
                CvrpError::InvalidConfig("population_size must be at least 1".into())
            });
            warn!(attempts = n, error = %last, "no attempt produced a feasible individual");
            return Err(CvrpError::NoFeasibleAttempt {
                attempts: n,
                last: Box::new(last),
            });
        };

        let elapsed = started.elapsed();
        info!(
            best_attempt,
            strategy = %best.strategy(),
            fitness = best.fitness(),
            elapsed_ms = elapsed.as_millis() as u64,
            "solve session finished"
        );
        Ok(SolveReport {
            best,
            best_attempt,
            attempts,
            elapsed,
        })
    }

    fn attempt(&self, index: usize) -> (AttemptRecord, Result<Individual, CvrpError>) {
        let strategy = self.config.strategy_for(index);
        let seed = self.config.seed_for(index);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let result = Individual::solve(self.instance, self.config, strategy, &mut rng);
        let record = match &result {
            Ok(individual) => {
                info!(attempt = index, strategy = %strategy, fitness = individual.fitness(), "attempt succeeded");
                AttemptRecord {
                    index,
                    strategy,
                    seed,
                    fitness: Some(individual.fitness()),
                    error: None,
                }
            }
            Err(e) => {
                warn!(attempt = index, strategy = %strategy, error = %e, "attempt failed");
                AttemptRecord {
                    index,
                    strategy,
                    seed,
                    fitness: None,
                    error: Some(e.to_string()),
                }
            }
        };
        (record, result)
    }
}
