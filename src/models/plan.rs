//! Route plans produced by the optimizer.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// One visit within a vehicle's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Position within the route, starting at 1.
    pub sequence: usize,
    /// Dispenser being refilled.
    pub dispenser_id: u32,
    /// Dispenser display name.
    pub name: String,
    /// Stop location.
    pub location: GeoPoint,
    /// Cash delivered at this stop.
    pub amount: f64,
    /// Travel distance from the previous stop (or the depot) in km.
    pub distance_from_prev_km: f64,
    /// Cumulative load after this stop.
    pub load_after: f64,
}

/// A capacity-feasible, cost-scored stop sequence for one vehicle.
///
/// Invariant: the cumulative load at every prefix of `stops` never exceeds
/// `vehicle_capacity`; the return-to-depot leg is included in the totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Assigned vehicle.
    pub vehicle_id: u32,
    /// Vehicle display name.
    pub vehicle_name: String,
    /// Vehicle cash capacity.
    pub vehicle_capacity: f64,
    /// Ordered stops.
    pub stops: Vec<Stop>,
    /// Total travel distance including the return leg, in km.
    pub total_distance_km: f64,
    /// Estimated travel time in hours.
    pub total_time_hours: f64,
    /// Travel cost (distance times the vehicle's cost per km).
    pub total_cost: f64,
    /// Total cash delivered.
    pub total_load: f64,
    /// Load as a percent of vehicle capacity.
    pub utilization_pct: f64,
}

impl RoutePlan {
    /// Number of stops on this route.
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the cumulative load at every prefix stays within
    /// the vehicle's capacity.
    pub fn capacity_feasible(&self) -> bool {
        self.stops.iter().all(|s| s.load_after <= self.vehicle_capacity + 1e-9)
    }
}

/// Why a refill stop could not be placed on any route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnservedReason {
    /// The stop's requirement exceeds every vehicle's capacity.
    ExceedsEveryVehicle {
        /// Required amount at the stop.
        amount: f64,
        /// Largest capacity in the fleet.
        max_capacity: f64,
    },
    /// All remaining fleet capacity was already committed.
    NoRemainingCapacity,
}

/// A refill stop left off the plan, with the violated constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unserved {
    /// Dispenser that could not be scheduled.
    pub dispenser_id: u32,
    /// Required amount.
    pub amount: f64,
    /// Constraint that excluded it.
    pub reason: UnservedReason,
}

/// The optimizer's output for one planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSet {
    /// One route per vehicle that received stops.
    pub routes: Vec<RoutePlan>,
    /// Stops that could not be scheduled, with diagnostics.
    pub unserved: Vec<Unserved>,
    /// Distance summed over all routes, in km.
    pub total_distance_km: f64,
    /// Cost summed over all routes.
    pub total_cost: f64,
}

impl PlanSet {
    /// An empty plan (no candidates to route).
    pub fn empty() -> Self {
        Self {
            routes: Vec::new(),
            unserved: Vec::new(),
            total_distance_km: 0.0,
            total_cost: 0.0,
        }
    }

    /// Total stops scheduled across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.num_stops()).sum()
    }

    /// Returns `true` if some candidates were left unscheduled.
    pub fn is_partial(&self) -> bool {
        !self.unserved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(seq: usize, amount: f64, load_after: f64) -> Stop {
        Stop {
            sequence: seq,
            dispenser_id: seq as u32,
            name: format!("d{seq}"),
            location: GeoPoint::new(0.0, seq as f64),
            amount,
            distance_from_prev_km: 1.0,
            load_after,
        }
    }

    #[test]
    fn test_capacity_feasible() {
        let plan = RoutePlan {
            vehicle_id: 1,
            vehicle_name: "Van".into(),
            vehicle_capacity: 300.0,
            stops: vec![stop(1, 100.0, 100.0), stop(2, 150.0, 250.0)],
            total_distance_km: 4.0,
            total_time_hours: 0.1,
            total_cost: 8.0,
            total_load: 250.0,
            utilization_pct: 83.3,
        };
        assert!(plan.capacity_feasible());
        assert_eq!(plan.num_stops(), 2);
    }

    #[test]
    fn test_capacity_infeasible_detected() {
        let plan = RoutePlan {
            vehicle_id: 1,
            vehicle_name: "Van".into(),
            vehicle_capacity: 200.0,
            stops: vec![stop(1, 250.0, 250.0)],
            total_distance_km: 2.0,
            total_time_hours: 0.05,
            total_cost: 4.0,
            total_load: 250.0,
            utilization_pct: 125.0,
        };
        assert!(!plan.capacity_feasible());
    }

    #[test]
    fn test_plan_set_counts() {
        let mut set = PlanSet::empty();
        assert_eq!(set.num_served(), 0);
        assert!(!set.is_partial());
        set.unserved.push(Unserved {
            dispenser_id: 9,
            amount: 100.0,
            reason: UnservedReason::NoRemainingCapacity,
        });
        assert!(set.is_partial());
    }
}
