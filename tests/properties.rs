//! Property-based tests for construction, local search and the multistart
//! driver.
//!
//! # Invariants tested
//!
//! - **Coverage:** every client is served exactly once.
//! - **Capacity:** no route exceeds its vehicle's capacity.
//! - **Monotonic improvement:** no local search operator lengthens a route.
//! - **Budget termination:** the deep search respects its iteration cap.
//! - **Best selection:** the session result is no worse than any attempt.
//! - **Determinism:** a fixed seed and strategy reproduce the same routes.

use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use u_cvrp::config::{DeepSearchConfig, OptimizerConfig, SolverConfig};
use u_cvrp::constructive::Strategy as Construction;
use u_cvrp::distance::DistanceMatrix;
use u_cvrp::local_search::{deep_search, three_opt, two_opt};
use u_cvrp::models::{Instance, Node, Route, Vehicle};
use u_cvrp::solver::{Individual, Population};

const LOCAL_STRATEGIES: [Construction; 3] = [
    Construction::HierarchicalClustering,
    Construction::KMeans,
    Construction::NearestNeighbor,
];

fn euclidean(points: &[(f64, f64)]) -> DistanceMatrix {
    let points = points.to_vec();
    DistanceMatrix::from_fn(points.len(), move |i, j| {
        let (dx, dy) = (points[i].0 - points[j].0, points[i].1 - points[j].1);
        (dx * dx + dy * dy).sqrt()
    })
}

/// Capacities leave every vehicle room for its share plus the largest
/// demand, so every placement-based strategy succeeds.
fn build_instance(points: &[(f64, f64)], demands: &[i32], n_vehicles: usize) -> Instance {
    let mut nodes = vec![Node::depot(0.0, 0.0)];
    for (i, (&(x, y), &d)) in points.iter().zip(demands).enumerate() {
        nodes.push(Node::new(i + 1, d, y, x));
    }
    let mut all = vec![(0.0, 0.0)];
    all.extend_from_slice(points);

    let total: i32 = demands.iter().sum();
    let max_demand = demands.iter().copied().max().unwrap_or(0);
    let capacity = total / n_vehicles as i32 + max_demand + 1;
    let vehicles = (0..n_vehicles).map(|v| Vehicle::new(v, capacity)).collect();
    Instance::new(nodes, vehicles, euclidean(&all)).expect("valid instance")
}

fn instance_strategy() -> impl Strategy<Value = Instance> {
    (4usize..12)
        .prop_flat_map(|n| {
            (
                prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), n),
                prop::collection::vec(1i32..6, n),
                2usize..4,
            )
        })
        .prop_map(|(points, demands, vehicles)| build_instance(&points, &demands, vehicles))
}

fn path_strategy() -> impl Strategy<Value = (Vec<(f64, f64)>, Vec<usize>)> {
    (3usize..14).prop_flat_map(|n| {
        (
            prop::collection::vec((-20.0f64..20.0, -20.0f64..20.0), n + 1),
            Just((1..=n).collect::<Vec<usize>>()).prop_shuffle(),
        )
    })
}

fn quick_config() -> SolverConfig {
    SolverConfig::default().with_optimizer(
        OptimizerConfig::default().with_deep_search(
            DeepSearchConfig::default()
                .with_max_iterations(60)
                .with_max_duration(Duration::from_secs(10)),
        ),
    )
}

fn closed(clients: &[usize]) -> Vec<usize> {
    let mut path = Vec::with_capacity(clients.len() + 2);
    path.push(0);
    path.extend_from_slice(clients);
    path.push(0);
    path
}

fn assert_same_nodes(before: &[usize], after: &[usize]) -> Result<(), TestCaseError> {
    prop_assert_eq!(after.first(), Some(&0));
    prop_assert_eq!(after.last(), Some(&0));
    let mut a = before.to_vec();
    let mut b = after.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    prop_assert_eq!(a, b);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: every local strategy yields an individual that serves each
    /// client once, within capacity, with fresh cached fitness.
    #[test]
    fn individuals_cover_clients_within_capacity(instance in instance_strategy(), seed in any::<u64>()) {
        let config = quick_config();
        for strategy in LOCAL_STRATEGIES {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let individual = Individual::solve(&instance, &config, strategy, &mut rng)
                .expect("capacities admit every strategy");
            prop_assert!(
                individual.is_feasible(&instance),
                "{} violated {:?}",
                strategy,
                individual.violations(&instance)
            );
            for route in individual.routes() {
                let capacity = instance.vehicle(route.vehicle_id()).map(|v| v.capacity());
                prop_assert!(Some(route.load()) <= capacity);
            }
            let sum: f64 = individual.routes().iter().map(Route::fitness).sum();
            prop_assert!((individual.fitness() - sum).abs() < 1e-9);
        }
    }

    /// Property: 2-opt, bounded 3-opt, unbounded 3-opt and the deep search
    /// never lengthen a path, and each reported gain matches the change.
    #[test]
    fn local_search_is_monotonic((points, clients) in path_strategy(), seed in any::<u64>()) {
        let dm = euclidean(&points);
        let mut path = closed(&clients);
        let original = path.clone();

        let before = dm.path_distance(&path);
        let gain = two_opt(&mut path, &dm);
        let after = dm.path_distance(&path);
        prop_assert!(after <= before + 1e-9);
        prop_assert!((before - gain - after).abs() < 1e-6);

        let before = after;
        let gain = three_opt(&mut path, &dm, Some(4));
        let after = dm.path_distance(&path);
        prop_assert!(after <= before + 1e-9);
        prop_assert!((before - gain - after).abs() < 1e-6);

        let before = after;
        let gain = three_opt(&mut path, &dm, None);
        let after = dm.path_distance(&path);
        prop_assert!(after <= before + 1e-9);
        prop_assert!((before - gain - after).abs() < 1e-6);

        let before = after;
        let config = DeepSearchConfig::default()
            .with_max_iterations(80)
            .with_max_duration(Duration::from_secs(10));
        let outcome = deep_search(&mut path, &dm, &config, &mut ChaCha8Rng::seed_from_u64(seed));
        let after = dm.path_distance(&path);
        prop_assert!(after <= before + 1e-9);
        prop_assert!(outcome.gain >= 0.0);

        assert_same_nodes(&original, &path)?;
    }

    /// Property: the deep search never runs more chains than allowed.
    #[test]
    fn deep_search_respects_iteration_budget(
        (points, clients) in path_strategy(),
        max_iterations in 0usize..40,
        perturb in any::<bool>(),
    ) {
        let dm = euclidean(&points);
        let mut path = closed(&clients);
        let config = DeepSearchConfig::default()
            .with_max_iterations(max_iterations)
            .with_max_duration(Duration::from_secs(10))
            .with_perturb(perturb);
        let outcome = deep_search(&mut path, &dm, &config, &mut ChaCha8Rng::seed_from_u64(0));
        prop_assert!(outcome.iterations <= max_iterations);
    }

    /// Property: the session result is no worse than any recorded attempt.
    #[test]
    fn population_keeps_the_minimum(instance in instance_strategy(), seed in any::<u64>()) {
        let config = quick_config()
            .with_population_size(4)
            .with_seed(seed)
            .with_strategies(LOCAL_STRATEGIES.to_vec());
        let report = Population::new(&instance, &config)
            .expect("valid config")
            .run()
            .expect("feasible");
        for attempt in &report.attempts {
            if let Some(fitness) = attempt.fitness {
                prop_assert!(report.best.fitness() <= fitness);
            }
        }
        prop_assert!(report.best.is_feasible(&instance));
    }

    /// Property: a fixed seed and strategy reproduce the same partition and
    /// fitness.
    #[test]
    fn attempts_are_deterministic(instance in instance_strategy(), seed in any::<u64>()) {
        let config = quick_config();
        for strategy in LOCAL_STRATEGIES {
            let a = Individual::solve(&instance, &config, strategy, &mut ChaCha8Rng::seed_from_u64(seed))
                .expect("feasible");
            let b = Individual::solve(&instance, &config, strategy, &mut ChaCha8Rng::seed_from_u64(seed))
                .expect("feasible");
            prop_assert_eq!(a.to_solution(), b.to_solution());
        }
    }
}
