//! Whole-problem delegation to the `vrp-core` solver.
//!
//! Available with the `external-solver` feature. Without it the strategy
//! reports [`CvrpError::StrategyUnavailable`] and the attempt is skipped.

use crate::config::ConstructionConfig;
use crate::error::CvrpError;
use crate::models::Instance;

use super::Assignment;

#[cfg(not(feature = "external-solver"))]
pub(super) fn solve(
    _instance: &Instance,
    _config: &ConstructionConfig,
) -> Result<Assignment, CvrpError> {
    Err(CvrpError::StrategyUnavailable(
        super::Strategy::ExternalSolver,
    ))
}

#[cfg(feature = "external-solver")]
pub(super) fn solve(
    instance: &Instance,
    config: &ConstructionConfig,
) -> Result<Assignment, CvrpError> {
    vrp::solve(instance, config)
}

#[cfg(feature = "external-solver")]
mod vrp {
    use std::sync::Arc;

    use vrp_core::models::problem::VehicleIdDimension;
    use vrp_core::prelude::*;

    use super::{Assignment, ConstructionConfig, CvrpError, Instance};

    fn vehicle_name(id: usize) -> String {
        format!("v{id}")
    }

    fn define_goal(transport: Arc<dyn TransportCost + Send + Sync>) -> GenericResult<GoalContext> {
        let minimize_unassigned = MinimizeUnassignedBuilder::new("min-unassigned").build()?;
        let capacity_feature = CapacityFeatureBuilder::<SingleDimLoad>::new("capacity").build()?;
        let transport_feature = TransportFeatureBuilder::new("min-distance")
            .set_transport_cost(transport)
            .set_time_constrained(false)
            .build_minimize_distance()?;

        GoalContextBuilder::with_features(&[minimize_unassigned, transport_feature, capacity_feature])?
            .build()
    }

    fn define_problem(
        instance: &Instance,
        goal: GoalContext,
        transport: Arc<dyn TransportCost + Send + Sync>,
    ) -> GenericResult<Problem> {
        let jobs = instance
            .client_ids()
            .map(|client| {
                SingleBuilder::default()
                    .id(format!("c{client}").as_str())
                    .demand(Demand::delivery(instance.demand(client)))
                    .location(client)?
                    .build_as_job()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let vehicles = instance
            .vehicles()
            .iter()
            .map(|vehicle| {
                VehicleBuilder::default()
                    .id(vehicle_name(vehicle.id()).as_str())
                    .add_detail(
                        VehicleDetailBuilder::default()
                            .set_start_location(0)
                            .set_end_location(0)
                            .build()?,
                    )
                    .capacity(SingleDimLoad::new(vehicle.capacity()))
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        ProblemBuilder::default()
            .add_jobs(jobs.into_iter())
            .add_vehicles(vehicles.into_iter())
            .with_goal(goal)
            .with_transport_cost(transport)
            .build()
    }

    fn transport(instance: &Instance) -> GenericResult<SimpleTransportCost> {
        let dm = instance.distances();
        let n = dm.size();
        let flat: Vec<f64> = (0..n)
            .flat_map(|i| (0..n).map(move |j| dm.get(i, j)))
            .collect();
        SimpleTransportCost::new(flat.clone(), flat)
    }

    fn external(e: impl std::fmt::Display) -> CvrpError {
        CvrpError::ExternalSolver(e.to_string())
    }

    pub(super) fn solve(
        instance: &Instance,
        config: &ConstructionConfig,
    ) -> Result<Assignment, CvrpError> {
        let transport: Arc<dyn TransportCost + Send + Sync> =
            Arc::new(transport(instance).map_err(external)?);
        let goal = define_goal(transport.clone()).map_err(external)?;
        let problem = Arc::new(define_problem(instance, goal, transport).map_err(external)?);

        let vrp_config = VrpConfigBuilder::new(problem.clone())
            .prebuild()
            .map_err(external)?
            .with_max_time(Some(config.external_max_time_secs))
            .with_max_generations(config.external_max_generations)
            .build()
            .map_err(external)?;

        let solution = Solver::new(problem, vrp_config).solve().map_err(external)?;
        if !solution.unassigned.is_empty() {
            return Err(CvrpError::ExternalSolver(format!(
                "{} jobs left unassigned",
                solution.unassigned.len()
            )));
        }

        let mut assignment: Assignment = instance
            .vehicles()
            .iter()
            .map(|v| (v.id(), Vec::new()))
            .collect();
        for (route, locations) in solution.routes.iter().zip(solution.get_locations()) {
            let name = route
                .actor
                .vehicle
                .dimens
                .get_vehicle_id()
                .ok_or_else(|| external("route without vehicle id"))?;
            let vehicle = instance
                .vehicles()
                .iter()
                .find(|v| &vehicle_name(v.id()) == name)
                .ok_or_else(|| external(format!("unknown vehicle {name}")))?;
            let clients = assignment
                .get_mut(&vehicle.id())
                .ok_or_else(|| external(format!("unknown vehicle {name}")))?;
            clients.extend(locations.filter(|&loc| loc != 0));
        }
        Ok(assignment)
    }
}
