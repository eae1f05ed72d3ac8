//! The synchronous planning cycle: resolve forecasts, rank refill
//! candidates, and route the fleet.
//!
//! A cycle never blocks on training. Dispensers without a fitted model fall
//! down the forecast cascade, and models trained against a drifted profile
//! are flagged in the response rather than refusing to plan.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::forecast::{ForecastResolver, ForecasterRegistry};
use crate::models::{Dispenser, Forecast, NetworkSnapshot, PlanSet, RefillCandidate, Vehicle};
use crate::priority::{
    build_candidate, needs_refill, rank_candidates, DEFAULT_PRIORITY_THRESHOLD,
    SCORING_HORIZON_DAYS,
};
use crate::routing::{optimize, RefillStop, RouteError};

/// Fraction of capacity the projected balance must stay above for a
/// dispenser to be skipped when explicitly requested.
const REFILL_SCREEN_PCT: f64 = 0.5;

/// Why a planning cycle could not run at all.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The requested depot is not in the snapshot.
    #[error("unknown depot {0}")]
    UnknownDepot(u32),
    /// A requested vehicle is not in the snapshot.
    #[error("unknown vehicle {0}")]
    UnknownVehicle(u32),
    /// Routing failed outright.
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// One planning cycle's inputs.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cash_replen::planning::PlanningRequest;
///
/// let req = PlanningRequest::new(1, vec![10, 11])
///     .with_time_limit(Duration::from_millis(200))
///     .with_priority_threshold(2.0);
/// assert_eq!(req.depot_id(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PlanningRequest {
    depot_id: u32,
    vehicle_ids: Vec<u32>,
    dispenser_ids: Option<Vec<u32>>,
    time_limit: Duration,
    priority_threshold: f64,
}

impl PlanningRequest {
    /// Creates a request for the given depot and vehicles. An empty vehicle
    /// list means the whole fleet.
    pub fn new(depot_id: u32, vehicle_ids: Vec<u32>) -> Self {
        Self {
            depot_id,
            vehicle_ids,
            dispenser_ids: None,
            time_limit: Duration::from_millis(500),
            priority_threshold: DEFAULT_PRIORITY_THRESHOLD,
        }
    }

    /// Restricts the cycle to an explicit dispenser list. These skip the
    /// priority filter and instead pass a projected-balance screen.
    pub fn with_dispensers(mut self, dispenser_ids: Vec<u32>) -> Self {
        self.dispenser_ids = Some(dispenser_ids);
        self
    }

    /// Sets the optimizer's improvement time budget.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Sets the priority threshold for candidate selection.
    pub fn with_priority_threshold(mut self, threshold: f64) -> Self {
        self.priority_threshold = threshold;
        self
    }

    /// Requested depot.
    pub fn depot_id(&self) -> u32 {
        self.depot_id
    }
}

/// Everything a dispatcher needs from one planning cycle.
#[derive(Debug, Clone, Serialize)]
pub struct PlanningResponse {
    /// Routes plus unserved diagnostics.
    pub plan: PlanSet,
    /// Audit rows: every scored candidate that fed the router, best first.
    pub candidates: Vec<RefillCandidate>,
    /// Dispensers whose model was trained against a drifted profile.
    pub stale_models: Vec<u32>,
}

/// Runs one planning cycle against a network snapshot.
///
/// Forecast resolution is total, so missing models degrade the forecast
/// tier instead of aborting. Errs on unknown depot or vehicle IDs, on an
/// empty active fleet, and when no requested stop can be scheduled at all.
pub fn plan_cycle<R: Rng>(
    snapshot: &NetworkSnapshot,
    registry: &ForecasterRegistry,
    request: &PlanningRequest,
    today: NaiveDate,
    rng: &mut R,
) -> Result<PlanningResponse, PlanError> {
    let depot = snapshot
        .depot(request.depot_id)
        .ok_or(PlanError::UnknownDepot(request.depot_id))?;

    let vehicles: Vec<Vehicle> = if request.vehicle_ids.is_empty() {
        snapshot.vehicles().to_vec()
    } else {
        request
            .vehicle_ids
            .iter()
            .map(|&id| {
                snapshot
                    .vehicle(id)
                    .cloned()
                    .ok_or(PlanError::UnknownVehicle(id))
            })
            .collect::<Result<_, _>>()?
    };

    let targets: Vec<&Dispenser> = match &request.dispenser_ids {
        Some(ids) => ids
            .iter()
            .filter_map(|&id| snapshot.dispenser(id))
            .collect(),
        None => snapshot.dispensers().iter().collect(),
    };

    let resolver = ForecastResolver::new(snapshot, registry, today);
    let forecasts: HashMap<u32, Forecast> = targets
        .iter()
        .map(|d| (d.id(), resolver.resolve(d.id(), SCORING_HORIZON_DAYS, rng)))
        .collect();

    let candidates = match &request.dispenser_ids {
        // Explicit selection: keep everything that will actually run low.
        Some(_) => {
            let mut picked: Vec<RefillCandidate> = targets
                .iter()
                .filter(|d| {
                    let day1 = forecasts
                        .get(&d.id())
                        .map_or(0.0, |f| f.demand_over(1));
                    needs_refill(d, day1, REFILL_SCREEN_PCT)
                })
                .map(|d| build_candidate(d, &forecasts[&d.id()], request.priority_threshold))
                .collect();
            picked.sort_by(|a, b| {
                b.priority
                    .total_cmp(&a.priority)
                    .then(a.dispenser_id.cmp(&b.dispenser_id))
            });
            picked
        }
        None => {
            let dispensers: Vec<Dispenser> = targets.iter().map(|d| (*d).clone()).collect();
            rank_candidates(&dispensers, &forecasts, request.priority_threshold)
        }
    };

    let stops: Vec<RefillStop> = candidates
        .iter()
        .filter(|c| c.required_amount > 0.0)
        .filter_map(|c| {
            let dispenser = snapshot.dispenser(c.dispenser_id)?;
            Some(RefillStop {
                dispenser_id: c.dispenser_id,
                name: c.name.clone(),
                location: dispenser.location(),
                amount: c.required_amount,
            })
        })
        .collect();

    let plan = optimize(depot, &stops, &vehicles, request.time_limit)?;

    let stale_models: Vec<u32> = targets
        .iter()
        .filter(|d| d.model_is_stale())
        .map(|d| d.id())
        .collect();

    info!(
        depot = depot.id(),
        candidates = candidates.len(),
        routes = plan.routes.len(),
        unserved = plan.unserved.len(),
        "planning cycle finished"
    );

    Ok(PlanningResponse {
        plan,
        candidates,
        stale_models,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BehaviorProfile, Depot, GeoPoint, ProfileFingerprint};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid")
    }

    // A snapshot with one nearly-empty dispenser, one full one, a depot,
    // and a van. With an empty registry and no history, every forecast
    // lands on the conservative tier (~60k/day).
    fn snapshot() -> NetworkSnapshot {
        NetworkSnapshot::new()
            .with_depot(Depot::new(1, "Central", GeoPoint::new(0.0, 0.0), 1e7, 5e6))
            .with_vehicle(Vehicle::new(10, "Van 1", 1_000_000.0))
            .with_dispenser(
                Dispenser::new(1, "Needy", GeoPoint::new(0.0, 0.5), 200_000.0, 20_000.0)
                    .with_days_since_refill(5),
            )
            .with_dispenser(
                Dispenser::new(2, "Full", GeoPoint::new(0.0, 0.6), 200_000.0, 195_000.0),
            )
    }

    #[test]
    fn test_unknown_depot() {
        let registry = ForecasterRegistry::new();
        let request = PlanningRequest::new(99, vec![10]);
        let err = plan_cycle(&snapshot(), &registry, &request, today(), &mut rng());
        assert!(matches!(err, Err(PlanError::UnknownDepot(99))));
    }

    #[test]
    fn test_unknown_vehicle() {
        let registry = ForecasterRegistry::new();
        let request = PlanningRequest::new(1, vec![77]);
        let err = plan_cycle(&snapshot(), &registry, &request, today(), &mut rng());
        assert!(matches!(err, Err(PlanError::UnknownVehicle(77))));
    }

    #[test]
    fn test_cycle_routes_the_needy_dispenser() {
        let registry = ForecasterRegistry::new();
        let request = PlanningRequest::new(1, vec![10]);
        let out = plan_cycle(&snapshot(), &registry, &request, today(), &mut rng())
            .expect("cycle runs");

        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.candidates[0].dispenser_id, 1);
        assert_eq!(out.plan.num_served(), 1);
        assert_eq!(out.plan.routes[0].stops[0].dispenser_id, 1);
        // Refill tops the dispenser back to capacity.
        assert!((out.plan.routes[0].stops[0].amount - 180_000.0).abs() < 1e-9);
        assert!(out.stale_models.is_empty());
    }

    #[test]
    fn test_empty_vehicle_list_uses_whole_fleet() {
        let registry = ForecasterRegistry::new();
        let request = PlanningRequest::new(1, vec![]);
        let out = plan_cycle(&snapshot(), &registry, &request, today(), &mut rng())
            .expect("cycle runs");
        assert_eq!(out.plan.routes[0].vehicle_id, 10);
    }

    #[test]
    fn test_explicit_list_screens_by_projected_balance() {
        let registry = ForecasterRegistry::new();
        // The full dispenser is requested explicitly but projects well above
        // half capacity after a day, so nothing is planned.
        let request = PlanningRequest::new(1, vec![10]).with_dispensers(vec![2]);
        let out = plan_cycle(&snapshot(), &registry, &request, today(), &mut rng())
            .expect("cycle runs");
        assert!(out.candidates.is_empty());
        assert_eq!(out.plan.num_served(), 0);
    }

    #[test]
    fn test_explicit_list_bypasses_priority_threshold() {
        let registry = ForecasterRegistry::new();
        // Threshold no candidate could clear; the explicit path ignores it.
        let request = PlanningRequest::new(1, vec![10])
            .with_dispensers(vec![1])
            .with_priority_threshold(1_000.0);
        let out = plan_cycle(&snapshot(), &registry, &request, today(), &mut rng())
            .expect("cycle runs");
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.plan.num_served(), 1);
    }

    #[test]
    fn test_stale_models_reported() {
        let registry = ForecasterRegistry::new();
        // Trained against a profile the dispenser no longer exhibits.
        let drifted = Dispenser::new(3, "Drifted", GeoPoint::new(0.0, 0.7), 200_000.0, 20_000.0)
            .with_days_since_refill(5)
            .with_avg_daily_demand(120_000.0)
            .with_training_record(
                ProfileFingerprint::of(BehaviorProfile::Residential),
                Utc::now(),
            );
        let snap = snapshot().with_dispenser(drifted);

        let request = PlanningRequest::new(1, vec![10]);
        let out =
            plan_cycle(&snap, &registry, &request, today(), &mut rng()).expect("cycle runs");
        assert_eq!(out.stale_models, vec![3]);
    }

    #[test]
    fn test_no_active_vehicles_is_an_error() {
        use crate::models::VehicleStatus;
        let registry = ForecasterRegistry::new();
        let snap = NetworkSnapshot::new()
            .with_depot(Depot::new(1, "Central", GeoPoint::new(0.0, 0.0), 1e7, 5e6))
            .with_vehicle(
                Vehicle::new(10, "Van", 1e6).with_status(VehicleStatus::Unavailable),
            )
            .with_dispenser(
                Dispenser::new(1, "Needy", GeoPoint::new(0.0, 0.5), 200_000.0, 20_000.0)
                    .with_days_since_refill(5),
            );
        let request = PlanningRequest::new(1, vec![10]);
        let err = plan_cycle(&snap, &registry, &request, today(), &mut rng());
        assert!(matches!(
            err,
            Err(PlanError::Route(RouteError::NoVehicles))
        ));
    }
}
