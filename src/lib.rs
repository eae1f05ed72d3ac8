//! # cash-replen
//!
//! Cash replenishment planning for ATM networks: demand forecasting with a
//! total fallback cascade, refill prioritization, capacitated multi-vehicle
//! routing, and a background training job pipeline.
//!
//! ## Modules
//!
//! - [`models`] — Domain types (Dispenser, Depot, Vehicle, forecasts, plans)
//! - [`distance`] — Great-circle distance matrix
//! - [`forecast`] — Predictor contract, registry, and the resolution cascade
//! - [`priority`] — Urgency scoring, candidate ranking, cadence recommendations
//! - [`routing`] — Fleet optimization, emergency insertion, substitution
//! - [`training`] — Background training jobs over a bounded worker pool
//! - [`planning`] — The synchronous planning cycle tying it all together
//! - [`context`] — Explicit process-wide context object

pub mod context;
pub mod distance;
pub mod forecast;
pub mod models;
pub mod planning;
pub mod priority;
pub mod routing;
pub mod training;
