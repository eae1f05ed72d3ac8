//! Single-vehicle route construction.
//!
//! # Algorithm
//!
//! Nearest neighbor from the depot, then 2-opt polish. Used when a run is
//! dispatched to one chosen vehicle rather than optimized across the fleet.

use std::time::{Duration, Instant};

use crate::distance::DistanceMatrix;
use crate::models::{Depot, GeoPoint, RoutePlan, Vehicle};

use super::evaluator::PlanBuilder;
use super::improve::two_opt;
use super::RefillStop;

/// Builds one vehicle's route over all given stops, visiting nearest-first.
///
/// Capacity is not enforced here; callers that need feasibility checks use
/// [`optimize`](super::optimize) or inspect
/// [`capacity_feasible`](RoutePlan::capacity_feasible) on the result.
pub fn single_vehicle_route(
    depot: &Depot,
    stops: &[RefillStop],
    vehicle: &Vehicle,
    time_limit: Duration,
) -> RoutePlan {
    let points: Vec<GeoPoint> = std::iter::once(depot.location())
        .chain(stops.iter().map(|s| s.location))
        .collect();
    let distances = DistanceMatrix::from_points(&points);
    let builder = PlanBuilder::new(stops, &distances);

    let mut sequence = Vec::with_capacity(stops.len());
    let mut visited = vec![false; stops.len()];
    let mut current = 0; // depot node

    for _ in 0..stops.len() {
        let next = (0..stops.len())
            .filter(|&i| !visited[i])
            .min_by(|&a, &b| {
                distances
                    .get(current, a + 1)
                    .total_cmp(&distances.get(current, b + 1))
            });
        let Some(idx) = next else { break };
        visited[idx] = true;
        sequence.push(idx);
        current = idx + 1;
    }

    two_opt(&mut sequence, &distances, Instant::now() + time_limit);
    builder.build(vehicle, &sequence)
}
