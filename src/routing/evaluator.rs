//! Builds scored [`RoutePlan`]s from stop sequences.

use crate::distance::DistanceMatrix;
use crate::models::{RoutePlan, Stop, Vehicle};

use super::RefillStop;

/// Assumed average travel speed for time estimates, in km/h.
pub const AVG_SPEED_KMH: f64 = 40.0;

/// Turns stop-index sequences into fully scored route plans.
///
/// The distance matrix convention throughout routing: node 0 is the depot,
/// node `i + 1` is `stops[i]`.
pub struct PlanBuilder<'a> {
    stops: &'a [RefillStop],
    distances: &'a DistanceMatrix,
}

impl<'a> PlanBuilder<'a> {
    /// Creates a builder over the cycle's stops and their distance matrix.
    pub fn new(stops: &'a [RefillStop], distances: &'a DistanceMatrix) -> Self {
        Self { stops, distances }
    }

    /// Total distance of `depot → sequence → depot`, where `sequence` holds
    /// 0-based stop indices.
    pub fn sequence_distance(&self, sequence: &[usize]) -> f64 {
        if sequence.is_empty() {
            return 0.0;
        }
        let mut dist = self.distances.get(0, sequence[0] + 1);
        for w in sequence.windows(2) {
            dist += self.distances.get(w[0] + 1, w[1] + 1);
        }
        dist + self.distances.get(sequence[sequence.len() - 1] + 1, 0)
    }

    /// Builds the plan for one vehicle visiting `sequence` (0-based stop
    /// indices) in order, including the return-to-depot leg in the totals.
    pub fn build(&self, vehicle: &Vehicle, sequence: &[usize]) -> RoutePlan {
        let mut stops = Vec::with_capacity(sequence.len());
        let mut load = 0.0;
        let mut total_distance = 0.0;
        let mut prev_node = 0;

        for (pos, &idx) in sequence.iter().enumerate() {
            let refill = &self.stops[idx];
            let leg = self.distances.get(prev_node, idx + 1);
            total_distance += leg;
            load += refill.amount;

            stops.push(Stop {
                sequence: pos + 1,
                dispenser_id: refill.dispenser_id,
                name: refill.name.clone(),
                location: refill.location,
                amount: refill.amount,
                distance_from_prev_km: leg,
                load_after: load,
            });
            prev_node = idx + 1;
        }

        if !sequence.is_empty() {
            total_distance += self.distances.get(prev_node, 0);
        }

        let utilization = if vehicle.capacity() > 0.0 {
            load / vehicle.capacity() * 100.0
        } else {
            0.0
        };

        RoutePlan {
            vehicle_id: vehicle.id(),
            vehicle_name: vehicle.name().to_string(),
            vehicle_capacity: vehicle.capacity(),
            stops,
            total_distance_km: total_distance,
            total_time_hours: total_distance / AVG_SPEED_KMH,
            total_cost: total_distance * vehicle.cost_per_km(),
            total_load: load,
            utilization_pct: utilization,
        }
    }
}
