//! Forecast resolution cascade.
//!
//! Always produces a usable demand estimate for any dispenser, degrading
//! confidence tier by tier instead of failing:
//!
//! 1. Trained model (skipped when a windowed method lacks history)
//! 2. Nearest modeled dispenser's forecast as a proxy
//! 3. Trailing daily average with weekday/weekend shaping (≥ 30 observed days)
//! 4. Conservative default with jitter

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rand::Rng;
use tracing::debug;

use crate::models::{
    daily_series, observed_days, trailing_daily_average, Confidence, Dispenser, Forecast,
    ForecastTier, NetworkSnapshot,
};

use super::ForecasterRegistry;

/// Minimum distinct observed days before the historical-average tier applies.
const HISTORY_MIN_DAYS: usize = 30;
/// Trailing window, in days, for the historical average.
const HISTORY_WINDOW_DAYS: i64 = 30;
/// Weekday demand multiplier for historical shaping.
const WEEKDAY_FACTOR: f64 = 1.1;
/// Weekend demand multiplier for historical shaping.
const WEEKEND_FACTOR: f64 = 0.8;
/// Safe per-day estimate when nothing else is available.
const CONSERVATIVE_BASE: f64 = 60_000.0;

/// Resolves demand forecasts for one planning cycle.
///
/// Borrows the cycle's snapshot and the shared registry; `today` anchors the
/// weekday/weekend pattern and the trailing history window so results are
/// deterministic for a given date.
pub struct ForecastResolver<'a> {
    snapshot: &'a NetworkSnapshot,
    registry: &'a ForecasterRegistry,
    today: NaiveDate,
}

impl<'a> ForecastResolver<'a> {
    /// Creates a resolver for the given cycle.
    pub fn new(snapshot: &'a NetworkSnapshot, registry: &'a ForecasterRegistry, today: NaiveDate) -> Self {
        Self {
            snapshot,
            registry,
            today,
        }
    }

    /// Produces a `horizon_days`-day forecast for a dispenser.
    ///
    /// Never fails: a dispenser missing from the snapshot, or one with no
    /// model and no history, still receives a conservative estimate.
    pub fn resolve<R: Rng>(&self, dispenser_id: u32, horizon_days: usize, rng: &mut R) -> Forecast {
        let Some(dispenser) = self.snapshot.dispenser(dispenser_id) else {
            debug!(dispenser_id, "unknown dispenser, conservative forecast");
            return self.conservative(dispenser_id, horizon_days, rng);
        };

        if let Some(values) = self.from_trained(dispenser, horizon_days) {
            return Forecast::new(dispenser_id, values, ForecastTier::TrainedModel, Confidence::High);
        }

        if let Some(forecast) = self.from_nearest(dispenser, horizon_days) {
            return forecast;
        }

        if let Some(forecast) = self.from_history(dispenser, horizon_days) {
            return forecast;
        }

        debug!(dispenser_id, "no model or history, conservative forecast");
        self.conservative(dispenser_id, horizon_days, rng)
    }

    /// Tier 1: ask the dispenser's own fitted predictor.
    ///
    /// Returns `None` (tier skipped, not retried) when there is no model,
    /// when a windowed method lacks enough history, or when prediction fails.
    fn from_trained(&self, dispenser: &Dispenser, horizon_days: usize) -> Option<Vec<f64>> {
        let predictor = self.registry.get(dispenser.id())?;
        let series;
        let history = match predictor.window() {
            Some(needed) => {
                series = daily_series(self.snapshot.history(dispenser.id()));
                if series.len() < needed {
                    debug!(
                        dispenser_id = dispenser.id(),
                        needed,
                        available = series.len(),
                        "windowed model lacks history, skipping trained tier"
                    );
                    return None;
                }
                Some(series.as_slice())
            }
            None => None,
        };

        match predictor.predict(horizon_days, history) {
            Ok(values) if values.len() == horizon_days => Some(values),
            Ok(_) | Err(_) => {
                debug!(dispenser_id = dispenser.id(), "trained model unusable, skipping tier");
                None
            }
        }
    }

    /// Tier 2: reuse the forecast of the geographically closest dispenser
    /// that has a trained model.
    fn from_nearest(&self, dispenser: &Dispenser, horizon_days: usize) -> Option<Forecast> {
        let nearest = self
            .snapshot
            .dispensers()
            .iter()
            .filter(|d| d.id() != dispenser.id() && self.registry.has_model(d.id()))
            .min_by(|a, b| {
                let da = dispenser.location().distance_km(a.location());
                let db = dispenser.location().distance_km(b.location());
                da.total_cmp(&db)
            })?;

        let values = self.from_trained(nearest, horizon_days)?;
        debug!(
            dispenser_id = dispenser.id(),
            proxy = nearest.id(),
            "using nearest modeled dispenser as proxy"
        );
        Some(
            Forecast::new(dispenser.id(), values, ForecastTier::NearestNeighbor, Confidence::Medium)
                .with_data_points(self.snapshot.history(dispenser.id()).len()),
        )
    }

    /// Tier 3: trailing daily average shaped by a weekday/weekend pattern,
    /// available once 30 distinct days have been observed.
    fn from_history(&self, dispenser: &Dispenser, horizon_days: usize) -> Option<Forecast> {
        let history = self.snapshot.history(dispenser.id());
        if observed_days(history) < HISTORY_MIN_DAYS {
            return None;
        }

        let as_of = self.today.and_time(NaiveTime::MIN).and_utc();
        let avg = trailing_daily_average(history, HISTORY_WINDOW_DAYS, as_of)
            .unwrap_or(CONSERVATIVE_BASE);

        let values = (0..horizon_days)
            .map(|i| {
                let date = self.today + Duration::days(i as i64);
                if is_weekend(date) {
                    avg * WEEKEND_FACTOR
                } else {
                    avg * WEEKDAY_FACTOR
                }
            })
            .collect();

        Some(
            Forecast::new(dispenser.id(), values, ForecastTier::HistoricalAverage, Confidence::Medium)
                .with_data_points(history.len()),
        )
    }

    /// Tier 4: fixed safe estimate with ±5% jitter so no dispenser ever
    /// receives a zero-variance flat line.
    fn conservative<R: Rng>(&self, dispenser_id: u32, horizon_days: usize, rng: &mut R) -> Forecast {
        let values = (0..horizon_days)
            .map(|_| CONSERVATIVE_BASE * (0.95 + 0.1 * rng.random::<f64>()))
            .collect();
        Forecast::new(dispenser_id, values, ForecastTier::ConservativeDefault, Confidence::Low)
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
