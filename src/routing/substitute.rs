//! Replacement vehicle ranking after a breakdown.

use serde::Serialize;

use crate::models::{RoutePlan, Vehicle};

/// A vehicle able to take over a failed vehicle's route, with its score.
#[derive(Debug, Clone, Serialize)]
pub struct SubstituteCandidate {
    /// Candidate vehicle ID.
    pub vehicle_id: u32,
    /// Candidate display name.
    pub name: String,
    /// Composite score; lower is better.
    pub score: f64,
    /// Travel cost of running the route at this vehicle's rate.
    pub estimated_cost: f64,
    /// Distance from the vehicle's last known position to the route's first
    /// stop, or zero when unknown.
    pub distance_to_route_km: f64,
}

/// Ranks active vehicles that could take over `plan` from `failed_id`.
///
/// A candidate must be active, not the failed vehicle, and have capacity
/// for the route's full load. Score combines the route cost at the
/// candidate's per-km rate with its distance to the first stop, so a
/// cheaper-but-distant truck competes with a pricier-but-nearby one.
/// Result is sorted best-first; empty means dispatch has no fallback.
pub fn substitution_candidates(
    plan: &RoutePlan,
    fleet: &[Vehicle],
    failed_id: u32,
) -> Vec<SubstituteCandidate> {
    let first_stop = plan.stops.first().map(|s| s.location);

    let mut candidates: Vec<SubstituteCandidate> = fleet
        .iter()
        .filter(|v| v.is_active() && v.id() != failed_id && v.capacity() >= plan.total_load)
        .map(|v| {
            let estimated_cost = plan.total_distance_km * v.cost_per_km();
            let distance_to_route_km = match (v.location(), first_stop) {
                (Some(at), Some(stop)) => at.distance_km(stop),
                _ => 0.0,
            };
            SubstituteCandidate {
                vehicle_id: v.id(),
                name: v.name().to_string(),
                score: estimated_cost + distance_to_route_km,
                estimated_cost,
                distance_to_route_km,
            }
        })
        .collect();

    candidates.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.vehicle_id.cmp(&b.vehicle_id)));
    candidates
}
