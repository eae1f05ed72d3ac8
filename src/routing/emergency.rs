//! Mid-route emergency stop insertion.
//!
//! When a dispenser runs dry while a vehicle is already out, the dispatcher
//! needs the cheapest point in the remaining stop sequence to divert to it.
//! The vehicle's current position anchors the first leg, so inserting at the
//! front is charged the full detour from the vehicle rather than a saved-leg
//! delta, and appending at the end charges only the leg to the emergency
//! (the return-to-depot leg is re-planned separately after a diversion).

use serde::Serialize;

use crate::models::GeoPoint;

use super::evaluator::AVG_SPEED_KMH;
use super::RefillStop;

/// Fuel cost per kilometer used for diversion estimates.
pub const FUEL_COST_PER_KM: f64 = 0.15;

/// The cheapest diversion found for an emergency stop.
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyInsertion {
    /// One-based position in the remaining sequence to insert the stop at.
    pub insert_position: usize,
    /// Marginal distance added to the route, in km.
    pub added_distance_km: f64,
    /// Extra time to reach the emergency from the vehicle's position.
    pub added_time_hours: f64,
    /// Fuel cost of the added distance.
    pub added_fuel_cost: f64,
    /// The remaining stop sequence with the emergency spliced in.
    pub updated_stops: Vec<RefillStop>,
}

/// Finds the cheapest insertion point for an emergency stop.
///
/// `remaining` is the not-yet-visited tail of the route. With no remaining
/// stops the vehicle simply diverts straight to the emergency.
pub fn plan_emergency_insertion(
    vehicle_location: GeoPoint,
    remaining: &[RefillStop],
    emergency: &RefillStop,
) -> EmergencyInsertion {
    let n = remaining.len();
    let mut best_pos = 0;
    let mut best_cost = f64::INFINITY;

    for i in 0..=n {
        let cost = if i == 0 {
            let to_emergency = vehicle_location.distance_km(emergency.location);
            match remaining.first() {
                Some(first) => to_emergency + emergency.location.distance_km(first.location),
                None => to_emergency,
            }
        } else if i == n {
            remaining[n - 1].location.distance_km(emergency.location)
        } else {
            let prev = &remaining[i - 1];
            let next = &remaining[i];
            prev.location.distance_km(emergency.location)
                + emergency.location.distance_km(next.location)
                - prev.location.distance_km(next.location)
        };

        if cost < best_cost {
            best_cost = cost;
            best_pos = i;
        }
    }

    let mut updated_stops = remaining.to_vec();
    updated_stops.insert(best_pos, emergency.clone());

    EmergencyInsertion {
        insert_position: best_pos + 1,
        added_distance_km: best_cost,
        added_time_hours: vehicle_location.distance_km(emergency.location) / AVG_SPEED_KMH,
        added_fuel_cost: best_cost * FUEL_COST_PER_KM,
        updated_stops,
    }
}
