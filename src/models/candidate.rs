//! Refill candidates: dispensers flagged for replenishment this cycle.

use serde::{Deserialize, Serialize};

use super::Confidence;

/// Criticality tier derived from the priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criticality {
    Critical,
    High,
    Medium,
    Low,
}

/// Recommended refill cadence bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefillCadence {
    Daily,
    EveryTwoDays,
    Weekly,
    BiWeekly,
}

/// A safety-buffer-adjusted refill interval recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceRecommendation {
    /// Days between refills, clamped to `[1, 14]`.
    pub recommended_days: u32,
    /// Bucketed cadence.
    pub cadence: RefillCadence,
    /// Confidence based on demand variability.
    pub confidence: Confidence,
    /// Mean of the daily demand series.
    pub avg_daily_demand: f64,
    /// Largest single-day demand in the series.
    pub max_daily_demand: f64,
    /// Projected days until the balance runs out at average demand.
    pub days_until_empty: f64,
    /// Coefficient of variation of the demand series.
    pub variability: f64,
}

/// A dispenser flagged as needing replenishment, with its urgency ranking.
///
/// Created fresh each planning cycle from a dispenser snapshot and its
/// resolved forecast; discarded once the cycle's route plan is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefillCandidate {
    /// Dispenser ID.
    pub dispenser_id: u32,
    /// Dispenser display name.
    pub name: String,
    /// Priority score; higher is more urgent.
    pub priority: f64,
    /// Criticality classification.
    pub criticality: Criticality,
    /// Predicted demand summed over the scoring horizon.
    pub predicted_demand: f64,
    /// Cash needed to refill to full capacity.
    pub required_amount: f64,
    /// Current balance as a percent of capacity.
    pub balance_pct: f64,
    /// Refill cadence recommendation.
    pub cadence: CadenceRecommendation,
}
