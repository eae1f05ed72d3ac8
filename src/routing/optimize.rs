//! Multi-vehicle route construction and optimization.
//!
//! # Algorithm
//!
//! Cheapest insertion: repeatedly pick the (stop, vehicle, position) triple
//! with the lowest marginal distance among capacity-feasible placements,
//! until nothing more fits. Constructed routes are then polished with 2-opt
//! and inter-route relocate until the time limit expires.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::distance::DistanceMatrix;
use crate::models::{Depot, GeoPoint, PlanSet, Unserved, UnservedReason, Vehicle};

use super::evaluator::PlanBuilder;
use super::improve::{insertion_cost, relocate, two_opt};
use super::RefillStop;

/// Why no plan could be produced at all.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The fleet has no dispatchable vehicle.
    #[error("no active vehicles available")]
    NoVehicles,
    /// Stops were requested but none could be placed on any vehicle.
    #[error("none of the {stops} refill stops could be scheduled")]
    Infeasible {
        /// Number of stops requested.
        stops: usize,
    },
}

/// Plans capacity-feasible routes for the active fleet.
///
/// Returns an empty plan for an empty stop list, and a partial plan with
/// per-stop diagnostics when only some stops fit. Errs only when there is
/// no active vehicle or when not a single stop could be scheduled.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cash_replen::models::{Depot, GeoPoint, Vehicle};
/// use cash_replen::routing::{optimize, RefillStop};
///
/// let depot = Depot::new(0, "Central", GeoPoint::new(0.0, 0.0), 10_000_000.0, 5_000_000.0);
/// let stops = vec![RefillStop {
///     dispenser_id: 1,
///     name: "Mall".into(),
///     location: GeoPoint::new(0.0, 0.5),
///     amount: 100_000.0,
/// }];
/// let vehicles = vec![Vehicle::new(1, "Van 1", 2_000_000.0)];
///
/// let plan = optimize(&depot, &stops, &vehicles, Duration::from_millis(50)).unwrap();
/// assert_eq!(plan.num_served(), 1);
/// assert!(!plan.is_partial());
/// ```
pub fn optimize(
    depot: &Depot,
    stops: &[RefillStop],
    vehicles: &[Vehicle],
    time_limit: Duration,
) -> Result<PlanSet, RouteError> {
    let fleet: Vec<&Vehicle> = vehicles.iter().filter(|v| v.is_active()).collect();
    if fleet.is_empty() {
        return Err(RouteError::NoVehicles);
    }
    if stops.is_empty() {
        return Ok(PlanSet::empty());
    }

    let deadline = Instant::now() + time_limit;
    let points: Vec<GeoPoint> = std::iter::once(depot.location())
        .chain(stops.iter().map(|s| s.location))
        .collect();
    let distances = DistanceMatrix::from_points(&points);

    let max_capacity = fleet
        .iter()
        .map(|v| v.capacity())
        .fold(0.0f64, f64::max);

    let mut unserved = Vec::new();
    let mut pending: Vec<usize> = Vec::new();
    for (idx, stop) in stops.iter().enumerate() {
        if stop.amount > max_capacity {
            unserved.push(Unserved {
                dispenser_id: stop.dispenser_id,
                amount: stop.amount,
                reason: UnservedReason::ExceedsEveryVehicle {
                    amount: stop.amount,
                    max_capacity,
                },
            });
        } else {
            pending.push(idx);
        }
    }

    let amounts: Vec<f64> = stops.iter().map(|s| s.amount).collect();
    let capacities: Vec<f64> = fleet.iter().map(|v| v.capacity()).collect();
    let mut routes: Vec<Vec<usize>> = vec![Vec::new(); fleet.len()];
    let mut loads = vec![0.0f64; fleet.len()];

    // Cheapest insertion over all (stop, vehicle, position) triples.
    while !pending.is_empty() {
        let mut best: Option<(usize, usize, usize, f64)> = None;

        for (p, &idx) in pending.iter().enumerate() {
            for (r, route) in routes.iter().enumerate() {
                if loads[r] + amounts[idx] > capacities[r] + 1e-9 {
                    continue;
                }
                for pos in 0..=route.len() {
                    let cost = insertion_cost(route, pos, idx, &distances);
                    if best.is_none_or(|(_, _, _, c)| cost < c) {
                        best = Some((p, r, pos, cost));
                    }
                }
            }
        }

        let Some((p, r, pos, _)) = best else { break };
        let idx = pending.swap_remove(p);
        routes[r].insert(pos, idx);
        loads[r] += amounts[idx];
    }

    for &idx in &pending {
        unserved.push(Unserved {
            dispenser_id: stops[idx].dispenser_id,
            amount: stops[idx].amount,
            reason: UnservedReason::NoRemainingCapacity,
        });
    }

    if routes.iter().all(Vec::is_empty) {
        return Err(RouteError::Infeasible { stops: stops.len() });
    }

    for route in routes.iter_mut() {
        two_opt(route, &distances, deadline);
    }
    relocate(&mut routes, &amounts, &capacities, &distances, deadline);
    for route in routes.iter_mut() {
        two_opt(route, &distances, deadline);
    }

    let builder = PlanBuilder::new(stops, &distances);
    let mut plans = Vec::new();
    for (r, route) in routes.iter().enumerate() {
        if route.is_empty() {
            continue;
        }
        let plan = builder.build(fleet[r], route);
        debug!(
            vehicle = plan.vehicle_id,
            stops = plan.num_stops(),
            distance_km = plan.total_distance_km,
            "route constructed"
        );
        plans.push(plan);
    }

    let total_distance_km = plans.iter().map(|p| p.total_distance_km).sum();
    let total_cost = plans.iter().map(|p| p.total_cost).sum();
    let served: usize = plans.iter().map(|p| p.num_stops()).sum();
    info!(
        routes = plans.len(),
        served,
        unserved = unserved.len(),
        "optimization finished"
    );

    Ok(PlanSet {
        routes: plans,
        unserved,
        total_distance_km,
        total_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleStatus;

    fn depot() -> Depot {
        Depot::new(0, "Central", GeoPoint::new(0.0, 0.0), 10_000_000.0, 5_000_000.0)
    }

    fn stop(id: u32, lat: f64, lon: f64, amount: f64) -> RefillStop {
        RefillStop {
            dispenser_id: id,
            name: format!("d{id}"),
            location: GeoPoint::new(lat, lon),
            amount,
        }
    }

    fn limit() -> Duration {
        Duration::from_millis(100)
    }

    #[test]
    fn test_no_active_vehicles() {
        let vehicles =
            vec![Vehicle::new(1, "Van", 1_000_000.0).with_status(VehicleStatus::Unavailable)];
        let stops = vec![stop(1, 0.0, 1.0, 100.0)];
        assert!(matches!(
            optimize(&depot(), &stops, &vehicles, limit()),
            Err(RouteError::NoVehicles)
        ));
    }

    #[test]
    fn test_empty_stops_is_empty_plan() {
        let vehicles = vec![Vehicle::new(1, "Van", 1_000_000.0)];
        let plan = optimize(&depot(), &[], &vehicles, limit()).expect("ok");
        assert_eq!(plan.num_served(), 0);
        assert!(plan.routes.is_empty());
    }

    #[test]
    fn test_all_stops_served_single_vehicle() {
        let vehicles = vec![Vehicle::new(1, "Van", 1_000_000.0)];
        let stops = vec![
            stop(1, 0.0, 1.0, 100.0),
            stop(2, 0.0, 2.0, 100.0),
            stop(3, 0.0, 3.0, 100.0),
        ];
        let plan = optimize(&depot(), &stops, &vehicles, limit()).expect("ok");
        assert_eq!(plan.num_served(), 3);
        assert!(!plan.is_partial());
        // Collinear stops: optimal order is monotone along the line.
        let ids: Vec<u32> = plan.routes[0].stops.iter().map(|s| s.dispenser_id).collect();
        assert!(ids == vec![1, 2, 3] || ids == vec![3, 2, 1]);
    }

    #[test]
    fn test_capacity_forces_partial_plan() {
        // Three 100k stops, one 250k vehicle: exactly one stop is left over.
        let vehicles = vec![Vehicle::new(1, "Van", 250_000.0)];
        let stops = vec![
            stop(1, 0.0, 1.0, 100_000.0),
            stop(2, 0.0, 2.0, 100_000.0),
            stop(3, 1.0, 0.0, 100_000.0),
        ];
        let plan = optimize(&depot(), &stops, &vehicles, limit()).expect("ok");
        assert_eq!(plan.num_served(), 2);
        assert_eq!(plan.unserved.len(), 1);
        assert_eq!(plan.unserved[0].reason, UnservedReason::NoRemainingCapacity);
        assert!(plan.routes[0].capacity_feasible());
    }

    #[test]
    fn test_oversized_stop_diagnosed() {
        let vehicles = vec![Vehicle::new(1, "Van", 200_000.0)];
        let stops = vec![stop(1, 0.0, 1.0, 500_000.0), stop(2, 0.0, 2.0, 100_000.0)];
        let plan = optimize(&depot(), &stops, &vehicles, limit()).expect("ok");
        assert_eq!(plan.num_served(), 1);
        assert_eq!(plan.unserved.len(), 1);
        assert!(matches!(
            plan.unserved[0].reason,
            UnservedReason::ExceedsEveryVehicle { max_capacity, .. }
                if (max_capacity - 200_000.0).abs() < 1e-9
        ));
    }

    #[test]
    fn test_nothing_schedulable_is_error() {
        let vehicles = vec![Vehicle::new(1, "Van", 50_000.0)];
        let stops = vec![stop(1, 0.0, 1.0, 500_000.0)];
        assert!(matches!(
            optimize(&depot(), &stops, &vehicles, limit()),
            Err(RouteError::Infeasible { stops: 1 })
        ));
    }

    #[test]
    fn test_multiple_vehicles_split_load() {
        let vehicles = vec![
            Vehicle::new(1, "Van 1", 150_000.0),
            Vehicle::new(2, "Van 2", 150_000.0),
        ];
        let stops = vec![
            stop(1, 0.0, 1.0, 100_000.0),
            stop(2, 0.0, -1.0, 100_000.0),
        ];
        let plan = optimize(&depot(), &stops, &vehicles, limit()).expect("ok");
        assert_eq!(plan.num_served(), 2);
        assert_eq!(plan.routes.len(), 2);
        for route in &plan.routes {
            assert!(route.capacity_feasible());
        }
    }

    #[test]
    fn test_unavailable_vehicle_never_used() {
        let vehicles = vec![
            Vehicle::new(1, "Broken", 1_000_000.0).with_status(VehicleStatus::Unavailable),
            Vehicle::new(2, "Van", 1_000_000.0),
        ];
        let stops = vec![stop(1, 0.0, 1.0, 100.0)];
        let plan = optimize(&depot(), &stops, &vehicles, limit()).expect("ok");
        assert_eq!(plan.routes.len(), 1);
        assert_eq!(plan.routes[0].vehicle_id, 2);
    }

    proptest::proptest! {
        // Whatever the amounts and fleet, every produced route stays within
        // its vehicle's capacity and every stop is either served or
        // diagnosed, never silently dropped.
        #[test]
        fn prop_every_stop_served_or_diagnosed(
            amounts in proptest::collection::vec(1_000.0f64..500_000.0, 1..12),
            caps in proptest::collection::vec(100_000.0f64..1_000_000.0, 1..4),
        ) {
            let stops: Vec<RefillStop> = amounts
                .iter()
                .enumerate()
                .map(|(i, &a)| stop(i as u32 + 1, 0.0, 0.01 * (i + 1) as f64, a))
                .collect();
            let vehicles: Vec<Vehicle> = caps
                .iter()
                .enumerate()
                .map(|(i, &c)| Vehicle::new(i as u32 + 1, format!("v{i}"), c))
                .collect();

            match optimize(&depot(), &stops, &vehicles, Duration::from_millis(20)) {
                Ok(plan) => {
                    for route in &plan.routes {
                        proptest::prop_assert!(route.capacity_feasible());
                    }
                    proptest::prop_assert_eq!(
                        plan.num_served() + plan.unserved.len(),
                        stops.len()
                    );
                }
                Err(RouteError::Infeasible { stops: n }) => {
                    proptest::prop_assert_eq!(n, stops.len());
                }
                Err(RouteError::NoVehicles) => proptest::prop_assert!(false),
            }
        }
    }

    #[test]
    fn test_totals_are_route_sums() {
        let vehicles = vec![
            Vehicle::new(1, "Van 1", 150_000.0),
            Vehicle::new(2, "Van 2", 150_000.0),
        ];
        let stops = vec![
            stop(1, 0.0, 1.0, 100_000.0),
            stop(2, 0.0, -1.0, 100_000.0),
        ];
        let plan = optimize(&depot(), &stops, &vehicles, limit()).expect("ok");
        let dist: f64 = plan.routes.iter().map(|r| r.total_distance_km).sum();
        let cost: f64 = plan.routes.iter().map(|r| r.total_cost).sum();
        assert!((plan.total_distance_km - dist).abs() < 1e-9);
        assert!((plan.total_cost - cost).abs() < 1e-9);
    }
}
