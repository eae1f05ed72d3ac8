//! Refill urgency scoring and classification.
//!
//! `priority = demand_ratio × time_factor × urgency_factor`, where demand is
//! the forecast sum over the scoring horizon, the time factor grows with
//! days since the last refill (capped at 2.0 after a week), and the urgency
//! factor steps up as the balance ratio crosses 60/40/20 percent.

use std::collections::HashMap;

use crate::models::{Criticality, Dispenser, Forecast, RefillCandidate};

use super::recommended_cadence;

/// Days of forecast demand folded into the priority score.
pub const SCORING_HORIZON_DAYS: usize = 7;

/// Default classification threshold for the "high" tier.
pub const DEFAULT_PRIORITY_THRESHOLD: f64 = 1.5;

/// Computes the priority score for one dispenser.
///
/// Zero when capacity is non-positive. Rounded to four decimals for stable
/// display and ordering.
///
/// # Examples
///
/// ```
/// use cash_replen::priority::priority_score;
///
/// // Worked example: 7-day demand 300k against 200k capacity, refilled
/// // 5 days ago, balance at 22.5% of capacity.
/// let p = priority_score(300_000.0, 200_000.0, 5, 45_000.0);
/// assert!((p - 2.1429).abs() < 1e-4);
/// ```
pub fn priority_score(
    predicted_demand: f64,
    capacity: f64,
    days_since_refill: u32,
    balance: f64,
) -> f64 {
    if capacity <= 0.0 {
        return 0.0;
    }

    let demand_ratio = predicted_demand / capacity;
    let time_factor = (days_since_refill as f64 / 7.0).min(2.0);

    let balance_ratio = balance / capacity;
    let urgency_factor = if balance_ratio < 0.2 {
        3.0
    } else if balance_ratio < 0.4 {
        2.0
    } else if balance_ratio < 0.6 {
        1.5
    } else {
        1.0
    };

    let score = demand_ratio * time_factor * urgency_factor;
    (score * 10_000.0).round() / 10_000.0
}

/// Classifies a priority score against the caller's threshold.
pub fn classify(score: f64, threshold: f64) -> Criticality {
    if score >= 2.5 {
        Criticality::Critical
    } else if score >= threshold {
        Criticality::High
    } else if score >= 1.0 {
        Criticality::Medium
    } else {
        Criticality::Low
    }
}

/// Returns `true` if the projected balance after one day of demand drops
/// below the given fraction of capacity.
pub fn needs_refill(dispenser: &Dispenser, day1_demand: f64, threshold_pct: f64) -> bool {
    let predicted_balance = dispenser.balance() - day1_demand;
    predicted_balance < dispenser.capacity() * threshold_pct
}

/// Builds the cycle's refill candidate list.
///
/// Dispensers without a forecast are skipped. Only candidates scoring at or
/// above `threshold`, or classified critical regardless of threshold, are
/// retained. Output is ordered by descending priority with dispenser ID as
/// the tie-break, so a cycle is deterministic for a given input.
pub fn rank_candidates(
    dispensers: &[Dispenser],
    forecasts: &HashMap<u32, Forecast>,
    threshold: f64,
) -> Vec<RefillCandidate> {
    let mut candidates: Vec<RefillCandidate> = dispensers
        .iter()
        .filter_map(|d| {
            let forecast = forecasts.get(&d.id())?;
            Some(build_candidate(d, forecast, threshold))
        })
        .filter(|c| c.priority >= threshold || c.criticality == Criticality::Critical)
        .collect();

    candidates.sort_by(|a, b| {
        b.priority
            .total_cmp(&a.priority)
            .then(a.dispenser_id.cmp(&b.dispenser_id))
    });
    candidates
}

/// Scores a single dispenser/forecast pair into a candidate.
pub fn build_candidate(dispenser: &Dispenser, forecast: &Forecast, threshold: f64) -> RefillCandidate {
    let predicted_demand = forecast.demand_over(SCORING_HORIZON_DAYS);
    let priority = priority_score(
        predicted_demand,
        dispenser.capacity(),
        dispenser.days_since_refill(),
        dispenser.balance(),
    );

    RefillCandidate {
        dispenser_id: dispenser.id(),
        name: dispenser.name().to_string(),
        priority,
        criticality: classify(priority, threshold),
        predicted_demand,
        required_amount: dispenser.refill_amount(),
        balance_pct: dispenser.balance_ratio() * 100.0,
        cadence: recommended_cadence(forecast.daily(), dispenser.capacity(), dispenser.balance()),
    }
}
