//! Refill cadence recommendation from forecast variability.
//!
//! The safety buffer shrinks as demand gets noisier: a stable series lets
//! the schedule run closer to empty, a volatile one forces earlier visits.

use crate::models::{CadenceRecommendation, Confidence, RefillCadence};

/// Recommended days between refills, clamped to this range.
const MIN_CADENCE_DAYS: u32 = 1;
const MAX_CADENCE_DAYS: u32 = 14;

/// Recommends a refill cadence from a daily demand forecast.
///
/// Days-until-empty is `balance / avg_daily_demand` (30 when demand is
/// zero), scaled by a safety buffer keyed to the coefficient of variation
/// and clamped to 1..=14 days. An empty forecast or non-positive capacity
/// yields a weekly recommendation at low confidence.
///
/// # Examples
///
/// ```
/// use cash_replen::models::RefillCadence;
/// use cash_replen::priority::recommended_cadence;
///
/// // Perfectly flat demand, ten days of balance: 10 × 0.8 buffer = 8 days.
/// let rec = recommended_cadence(&[1_000.0; 7], 100_000.0, 10_000.0);
/// assert_eq!(rec.recommended_days, 8);
/// assert_eq!(rec.cadence, RefillCadence::BiWeekly);
/// ```
pub fn recommended_cadence(demands: &[f64], capacity: f64, balance: f64) -> CadenceRecommendation {
    if demands.is_empty() || capacity <= 0.0 {
        return CadenceRecommendation {
            recommended_days: 7,
            cadence: RefillCadence::Weekly,
            confidence: Confidence::Low,
            avg_daily_demand: 0.0,
            max_daily_demand: 0.0,
            days_until_empty: 0.0,
            variability: 0.0,
        };
    }

    let n = demands.len() as f64;
    let avg = demands.iter().sum::<f64>() / n;
    let max = demands.iter().fold(0.0f64, |m, &v| m.max(v));
    let variance = demands.iter().map(|&v| (v - avg).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let days_until_empty = if avg > 0.0 { balance / avg } else { 30.0 };
    let cv = if avg > 0.0 { std_dev / avg } else { 0.0 };

    let (buffer, confidence) = if cv < 0.2 {
        (0.8, Confidence::High)
    } else if cv < 0.4 {
        (0.6, Confidence::Medium)
    } else {
        (0.4, Confidence::Low)
    };

    let raw = (days_until_empty * buffer) as u32;
    let recommended_days = raw.clamp(MIN_CADENCE_DAYS, MAX_CADENCE_DAYS);

    let cadence = if recommended_days <= 2 {
        RefillCadence::Daily
    } else if recommended_days <= 4 {
        RefillCadence::EveryTwoDays
    } else if recommended_days <= 7 {
        RefillCadence::Weekly
    } else {
        RefillCadence::BiWeekly
    };

    CadenceRecommendation {
        recommended_days,
        cadence,
        confidence,
        avg_daily_demand: avg,
        max_daily_demand: max,
        days_until_empty,
        variability: cv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_demand_high_confidence() {
        let rec = recommended_cadence(&[1_000.0; 7], 100_000.0, 10_000.0);
        assert_eq!(rec.confidence, Confidence::High);
        assert!((rec.variability).abs() < 1e-12);
        assert!((rec.days_until_empty - 10.0).abs() < 1e-9);
        // 10 days × 0.8 buffer, truncated.
        assert_eq!(rec.recommended_days, 8);
        assert_eq!(rec.cadence, RefillCadence::BiWeekly);
    }

    #[test]
    fn test_volatile_demand_shrinks_buffer() {
        // Mean 1000, large swings: cv well above 0.4.
        let demands = [200.0, 1_800.0, 100.0, 1_900.0, 150.0, 1_850.0, 1_000.0];
        let rec = recommended_cadence(&demands, 100_000.0, 10_000.0);
        assert_eq!(rec.confidence, Confidence::Low);
        assert!(rec.variability >= 0.4);
        assert!(rec.recommended_days <= 4);
    }

    #[test]
    fn test_near_empty_clamps_to_one_day() {
        let rec = recommended_cadence(&[5_000.0; 7], 100_000.0, 2_000.0);
        assert_eq!(rec.recommended_days, 1);
        assert_eq!(rec.cadence, RefillCadence::Daily);
    }

    #[test]
    fn test_large_balance_clamps_to_fourteen_days() {
        let rec = recommended_cadence(&[1_000.0; 7], 500_000.0, 400_000.0);
        assert_eq!(rec.recommended_days, 14);
        assert_eq!(rec.cadence, RefillCadence::BiWeekly);
    }

    #[test]
    fn test_zero_demand_uses_thirty_day_horizon() {
        let rec = recommended_cadence(&[0.0; 7], 100_000.0, 50_000.0);
        assert!((rec.days_until_empty - 30.0).abs() < 1e-9);
        assert_eq!(rec.recommended_days, 14);
    }

    #[test]
    fn test_empty_forecast_defaults_weekly() {
        let rec = recommended_cadence(&[], 100_000.0, 50_000.0);
        assert_eq!(rec.recommended_days, 7);
        assert_eq!(rec.cadence, RefillCadence::Weekly);
        assert_eq!(rec.confidence, Confidence::Low);
    }

    #[test]
    fn test_bucket_boundaries() {
        // days_until_empty chosen so buffered value lands on each boundary.
        let daily = recommended_cadence(&[1_000.0; 7], 100_000.0, 2_500.0);
        assert_eq!(daily.recommended_days, 2);
        assert_eq!(daily.cadence, RefillCadence::Daily);

        let every_two = recommended_cadence(&[1_000.0; 7], 100_000.0, 5_000.0);
        assert_eq!(every_two.recommended_days, 4);
        assert_eq!(every_two.cadence, RefillCadence::EveryTwoDays);

        let weekly = recommended_cadence(&[1_000.0; 7], 100_000.0, 8_750.0);
        assert_eq!(weekly.recommended_days, 7);
        assert_eq!(weekly.cadence, RefillCadence::Weekly);
    }
}
