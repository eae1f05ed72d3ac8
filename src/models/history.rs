//! Raw withdrawal history and daily demand aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single withdrawal observed at a dispenser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// When the withdrawal happened.
    pub timestamp: DateTime<Utc>,
    /// Amount withdrawn.
    pub amount: f64,
}

impl Transaction {
    /// Creates a transaction record.
    pub fn new(timestamp: DateTime<Utc>, amount: f64) -> Self {
        Self { timestamp, amount }
    }
}

/// Aggregates transactions into chronologically ordered daily totals.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use cash_replen::models::{daily_totals, Transaction};
///
/// let txs = vec![
///     Transaction::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(), 500.0),
///     Transaction::new(Utc.with_ymd_and_hms(2026, 3, 1, 17, 0, 0).unwrap(), 300.0),
///     Transaction::new(Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(), 200.0),
/// ];
/// let days = daily_totals(&txs);
/// assert_eq!(days.len(), 2);
/// assert_eq!(days[0].1, 800.0);
/// ```
pub fn daily_totals(transactions: &[Transaction]) -> Vec<(NaiveDate, f64)> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for tx in transactions {
        *by_day.entry(tx.timestamp.date_naive()).or_insert(0.0) += tx.amount;
    }
    by_day.into_iter().collect()
}

/// The daily demand series as plain values, oldest first.
pub fn daily_series(transactions: &[Transaction]) -> Vec<f64> {
    daily_totals(transactions).into_iter().map(|(_, v)| v).collect()
}

/// Number of distinct days with at least one observed transaction.
pub fn observed_days(transactions: &[Transaction]) -> usize {
    daily_totals(transactions).len()
}

/// Average of the daily totals observed within the trailing window ending at
/// `as_of`. Returns `None` when the window contains no transactions.
pub fn trailing_daily_average(
    transactions: &[Transaction],
    days_back: i64,
    as_of: DateTime<Utc>,
) -> Option<f64> {
    let cutoff = as_of - Duration::days(days_back);
    let recent: Vec<Transaction> = transactions
        .iter()
        .copied()
        .filter(|t| t.timestamp >= cutoff && t.timestamp <= as_of)
        .collect();
    let days = daily_totals(&recent);
    if days.is_empty() {
        return None;
    }
    let total: f64 = days.iter().map(|(_, v)| v).sum();
    Some(total / days.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(day: u32, hour: u32, amount: f64) -> Transaction {
        Transaction::new(
            Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).single().expect("valid"),
            amount,
        )
    }

    #[test]
    fn test_daily_totals_groups_and_sorts() {
        let txs = vec![tx(3, 10, 100.0), tx(1, 9, 50.0), tx(3, 18, 25.0)];
        let days = daily_totals(&txs);
        assert_eq!(days.len(), 2);
        assert!(days[0].0 < days[1].0);
        assert_eq!(days[1].1, 125.0);
    }

    #[test]
    fn test_daily_series() {
        let txs = vec![tx(1, 9, 50.0), tx(2, 9, 70.0)];
        assert_eq!(daily_series(&txs), vec![50.0, 70.0]);
    }

    #[test]
    fn test_observed_days() {
        let txs = vec![tx(1, 9, 1.0), tx(1, 10, 1.0), tx(5, 9, 1.0)];
        assert_eq!(observed_days(&txs), 2);
    }

    #[test]
    fn test_trailing_average_window() {
        let as_of = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).single().expect("valid");
        let txs = vec![tx(1, 9, 999.0), tx(8, 9, 100.0), tx(9, 9, 200.0)];
        // Only days 8 and 9 fall inside a 3-day window.
        let avg = trailing_daily_average(&txs, 3, as_of).expect("has data");
        assert!((avg - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_average_empty() {
        let as_of = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).single().expect("valid");
        assert!(trailing_daily_average(&[], 30, as_of).is_none());
    }
}
