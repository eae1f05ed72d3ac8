//! Route planning for replenishment runs: fleet-wide optimization,
//! single-vehicle dispatch, mid-route emergency insertion, and breakdown
//! substitution.

use serde::{Deserialize, Serialize};

use crate::models::GeoPoint;

mod emergency;
mod evaluator;
mod improve;
mod optimize;
mod single;
mod substitute;

pub use emergency::{plan_emergency_insertion, EmergencyInsertion, FUEL_COST_PER_KM};
pub use evaluator::{PlanBuilder, AVG_SPEED_KMH};
pub use optimize::{optimize, RouteError};
pub use single::single_vehicle_route;
pub use substitute::{substitution_candidates, SubstituteCandidate};

/// One refill requirement handed to the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefillStop {
    /// Dispenser to visit.
    pub dispenser_id: u32,
    /// Dispenser display name.
    pub name: String,
    /// Where the dispenser is.
    pub location: GeoPoint,
    /// Cash to deliver.
    pub amount: f64,
}
