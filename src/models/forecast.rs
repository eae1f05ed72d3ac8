//! Demand forecasts and resolution metadata.

use serde::{Deserialize, Serialize};

/// Which fallback tier produced a forecast, ranked by confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastTier {
    /// A fitted predictor for this dispenser.
    TrainedModel,
    /// The resolved forecast of the geographically closest modeled dispenser.
    NearestNeighbor,
    /// Trailing daily average shaped by a weekday/weekend pattern.
    HistoricalAverage,
    /// Fixed safe estimate with jitter; last resort.
    ConservativeDefault,
}

/// Confidence label attached to forecasts and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A per-day demand estimate for one dispenser.
///
/// Forecasts are ephemeral: recomputed each planning cycle and never
/// persisted as authoritative state. Values are always non-negative.
///
/// # Examples
///
/// ```
/// use cash_replen::models::{Confidence, Forecast, ForecastTier};
///
/// let f = Forecast::new(1, vec![100.0, -5.0, 80.0], ForecastTier::HistoricalAverage, Confidence::Medium);
/// assert_eq!(f.daily(), &[100.0, 0.0, 80.0]); // negatives clamped
/// assert_eq!(f.horizon(), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    dispenser_id: u32,
    daily: Vec<f64>,
    tier: ForecastTier,
    confidence: Confidence,
    data_points: Option<usize>,
}

impl Forecast {
    /// Creates a forecast, clamping any negative values to zero.
    pub fn new(dispenser_id: u32, daily: Vec<f64>, tier: ForecastTier, confidence: Confidence) -> Self {
        let daily = daily.into_iter().map(|v| v.max(0.0)).collect();
        Self {
            dispenser_id,
            daily,
            tier,
            confidence,
            data_points: None,
        }
    }

    /// Attaches the number of historical observations backing this forecast.
    pub fn with_data_points(mut self, count: usize) -> Self {
        self.data_points = Some(count);
        self
    }

    /// Dispenser this forecast is for.
    pub fn dispenser_id(&self) -> u32 {
        self.dispenser_id
    }

    /// Per-day demand values, non-negative.
    pub fn daily(&self) -> &[f64] {
        &self.daily
    }

    /// Number of forecast days.
    pub fn horizon(&self) -> usize {
        self.daily.len()
    }

    /// Resolution tier that produced this forecast.
    pub fn tier(&self) -> ForecastTier {
        self.tier
    }

    /// Confidence label.
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Historical observation count, when a data-backed tier was used.
    pub fn data_points(&self) -> Option<usize> {
        self.data_points
    }

    /// Sum of predicted demand over the first `days` days (or fewer if the
    /// horizon is shorter).
    pub fn demand_over(&self, days: usize) -> f64 {
        self.daily.iter().take(days).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_values_clamped() {
        let f = Forecast::new(1, vec![-1.0, 2.0], ForecastTier::TrainedModel, Confidence::High);
        assert_eq!(f.daily(), &[0.0, 2.0]);
    }

    #[test]
    fn test_demand_over() {
        let f = Forecast::new(
            1,
            vec![10.0, 20.0, 30.0],
            ForecastTier::ConservativeDefault,
            Confidence::Low,
        );
        assert_eq!(f.demand_over(2), 30.0);
        assert_eq!(f.demand_over(7), 60.0);
    }

    #[test]
    fn test_data_points_metadata() {
        let f = Forecast::new(1, vec![1.0], ForecastTier::HistoricalAverage, Confidence::Medium)
            .with_data_points(42);
        assert_eq!(f.data_points(), Some(42));
    }
}
