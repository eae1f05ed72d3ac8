//! Record of the profile each dispenser's models were trained against.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::models::{Dispenser, ProfileFingerprint};

/// What the ledger remembers about one dispenser's last training run.
#[derive(Debug, Clone, Copy)]
pub struct LedgerEntry {
    /// Fingerprint of the profile in effect when training ran.
    pub fingerprint: ProfileFingerprint,
    /// When training completed.
    pub trained_at: DateTime<Utc>,
}

/// Tracks, per dispenser, the profile fingerprint recorded at training time.
///
/// Staleness is a fingerprint comparison: a dispenser whose detected profile
/// has drifted away from the recorded fingerprint needs retraining. A
/// dispenser with no entry was never trained, which is unmodeled rather than
/// stale.
#[derive(Default)]
pub struct ProfileLedger {
    entries: Mutex<HashMap<u32, LedgerEntry>>,
}

impl ProfileLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed training run for a dispenser.
    pub fn record(&self, dispenser_id: u32, fingerprint: ProfileFingerprint, at: DateTime<Utc>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                dispenser_id,
                LedgerEntry {
                    fingerprint,
                    trained_at: at,
                },
            );
        }
    }

    /// The last training record for a dispenser, if any.
    pub fn last_trained(&self, dispenser_id: u32) -> Option<LedgerEntry> {
        self.entries.lock().ok()?.get(&dispenser_id).copied()
    }

    /// Returns `true` if the dispenser was trained against a profile that no
    /// longer matches its currently detected one.
    pub fn is_stale(&self, dispenser: &Dispenser) -> bool {
        match self.last_trained(dispenser.id()) {
            Some(entry) => entry.fingerprint != dispenser.fingerprint(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BehaviorProfile, GeoPoint};

    fn dispenser() -> Dispenser {
        Dispenser::new(1, "d1", GeoPoint::new(0.0, 0.0), 200_000.0, 50_000.0)
            .with_avg_daily_demand(40_000.0)
    }

    #[test]
    fn test_record_and_read() {
        let ledger = ProfileLedger::new();
        assert!(ledger.last_trained(1).is_none());

        let d = dispenser();
        ledger.record(d.id(), d.fingerprint(), Utc::now());
        let entry = ledger.last_trained(1).expect("recorded");
        assert_eq!(entry.fingerprint, d.fingerprint());
    }

    #[test]
    fn test_never_trained_is_not_stale() {
        let ledger = ProfileLedger::new();
        assert!(!ledger.is_stale(&dispenser()));
    }

    #[test]
    fn test_profile_drift_is_stale() {
        let ledger = ProfileLedger::new();
        let d = dispenser();
        ledger.record(d.id(), d.fingerprint(), Utc::now());
        assert!(!ledger.is_stale(&d));

        // Same dispenser, demand pattern now in a different class.
        let drifted = d.with_avg_daily_demand(150_000.0);
        assert!(ledger.is_stale(&drifted));
    }

    #[test]
    fn test_retraining_clears_staleness() {
        let ledger = ProfileLedger::new();
        let d = dispenser().with_profile(BehaviorProfile::Shopping);
        ledger.record(d.id(), ProfileFingerprint::of(BehaviorProfile::Residential), Utc::now());
        assert!(ledger.is_stale(&d));

        ledger.record(d.id(), d.fingerprint(), Utc::now());
        assert!(!ledger.is_stale(&d));
    }
}
