//! Domain model types for the replenishment planning core.
//!
//! Provides the snapshots the storage collaborator supplies (dispensers,
//! depots, vehicles, withdrawal history) and the derived entities the core
//! produces (forecasts, refill candidates, route plans).

mod candidate;
mod depot;
mod dispenser;
mod forecast;
mod geo;
mod history;
mod plan;
mod snapshot;
mod vehicle;

pub use candidate::{CadenceRecommendation, Criticality, RefillCadence, RefillCandidate};
pub use depot::Depot;
pub use dispenser::{BehaviorProfile, Dispenser, ProfileFingerprint};
pub use forecast::{Confidence, Forecast, ForecastTier};
pub use geo::GeoPoint;
pub use history::{daily_series, daily_totals, observed_days, trailing_daily_average, Transaction};
pub use plan::{PlanSet, RoutePlan, Stop, Unserved, UnservedReason};
pub use snapshot::NetworkSnapshot;
pub use vehicle::{Vehicle, VehicleStatus};
