//! Cash dispenser snapshot, behavioral profiles, and training staleness.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Version of the profile parameter set folded into every fingerprint.
/// Bump when the meaning of a profile class changes, so that models trained
/// against the old semantics read as stale.
const PROFILE_VERSION: u32 = 1;

/// Demand-shape class a dispenser exhibits.
///
/// Either assigned explicitly by an operator or detected from the
/// dispenser's rolling average demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorProfile {
    /// Weekday-heavy, high volume.
    BusinessDistrict,
    /// Evening/weekend-heavy, moderate volume.
    Residential,
    /// Steady all-week traffic.
    TransitHub,
    /// Weekend-heavy retail traffic.
    Shopping,
    /// Term-time bursts, low baseline.
    University,
}

/// A fingerprint of the profile parameters a model was trained against.
///
/// Compared at read time to flag drift: if a dispenser's detected profile no
/// longer hashes to the fingerprint recorded at training time, the model is
/// stale (still usable, but due for retraining).
///
/// # Examples
///
/// ```
/// use cash_replen::models::{BehaviorProfile, ProfileFingerprint};
///
/// let a = ProfileFingerprint::of(BehaviorProfile::Residential);
/// let b = ProfileFingerprint::of(BehaviorProfile::Residential);
/// assert_eq!(a, b);
/// assert_ne!(a, ProfileFingerprint::of(BehaviorProfile::Shopping));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFingerprint(u64);

impl ProfileFingerprint {
    /// Computes the fingerprint for a profile under the current version.
    pub fn of(profile: BehaviorProfile) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        PROFILE_VERSION.hash(&mut hasher);
        profile.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Read-only snapshot of a cash dispenser, supplied by the storage
/// collaborator at the start of a planning cycle.
///
/// # Examples
///
/// ```
/// use cash_replen::models::{Dispenser, GeoPoint};
///
/// let d = Dispenser::new(1, "Central Station", GeoPoint::new(12.97, 77.59), 500_000.0, 120_000.0)
///     .with_avg_daily_demand(60_000.0)
///     .with_days_since_refill(4);
/// assert_eq!(d.id(), 1);
/// assert!((d.balance_ratio() - 0.24).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispenser {
    id: u32,
    name: String,
    location: GeoPoint,
    capacity: f64,
    balance: f64,
    avg_daily_demand: f64,
    days_since_refill: u32,
    profile: Option<BehaviorProfile>,
    last_trained_fingerprint: Option<ProfileFingerprint>,
    last_trained_at: Option<DateTime<Utc>>,
}

impl Dispenser {
    /// Creates a dispenser snapshot with the given identity and cash state.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        location: GeoPoint,
        capacity: f64,
        balance: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            capacity,
            balance,
            avg_daily_demand: 0.0,
            days_since_refill: 0,
            profile: None,
            last_trained_fingerprint: None,
            last_trained_at: None,
        }
    }

    /// Sets the rolling average daily demand.
    pub fn with_avg_daily_demand(mut self, amount: f64) -> Self {
        self.avg_daily_demand = amount;
        self
    }

    /// Sets the number of days since the last successful refill.
    pub fn with_days_since_refill(mut self, days: u32) -> Self {
        self.days_since_refill = days;
        self
    }

    /// Assigns an explicit behavioral profile, overriding detection.
    pub fn with_profile(mut self, profile: BehaviorProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Records the fingerprint and timestamp of the last model training.
    pub fn with_training_record(
        mut self,
        fingerprint: ProfileFingerprint,
        at: DateTime<Utc>,
    ) -> Self {
        self.last_trained_fingerprint = Some(fingerprint);
        self.last_trained_at = Some(at);
        self
    }

    /// Dispenser ID.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geographic location.
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Maximum cash capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Current cash balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Rolling average daily demand.
    pub fn avg_daily_demand(&self) -> f64 {
        self.avg_daily_demand
    }

    /// Days since the last successful refill.
    pub fn days_since_refill(&self) -> u32 {
        self.days_since_refill
    }

    /// Explicitly assigned profile, if any.
    pub fn profile(&self) -> Option<BehaviorProfile> {
        self.profile
    }

    /// Timestamp of the last successful model training, if any.
    pub fn last_trained_at(&self) -> Option<DateTime<Utc>> {
        self.last_trained_at
    }

    /// Current balance as a fraction of capacity, clamped to `[0, 1]`.
    pub fn balance_ratio(&self) -> f64 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        (self.balance / self.capacity).clamp(0.0, 1.0)
    }

    /// Cash needed to refill to full capacity.
    pub fn refill_amount(&self) -> f64 {
        (self.capacity - self.balance).max(0.0)
    }

    /// The profile this dispenser currently exhibits.
    ///
    /// An explicit assignment wins; otherwise the class is detected from the
    /// rolling average daily demand.
    pub fn detected_profile(&self) -> BehaviorProfile {
        if let Some(p) = self.profile {
            return p;
        }
        match self.avg_daily_demand {
            d if d >= 100_000.0 => BehaviorProfile::BusinessDistrict,
            d if d >= 70_000.0 => BehaviorProfile::TransitHub,
            d if d >= 50_000.0 => BehaviorProfile::Shopping,
            d if d >= 30_000.0 => BehaviorProfile::Residential,
            _ => BehaviorProfile::University,
        }
    }

    /// Fingerprint of the currently detected profile.
    pub fn fingerprint(&self) -> ProfileFingerprint {
        ProfileFingerprint::of(self.detected_profile())
    }

    /// Returns `true` if a model was trained for this dispenser but against
    /// a profile that no longer matches the detected one.
    ///
    /// A dispenser that was never trained is not stale, merely unmodeled.
    pub fn model_is_stale(&self) -> bool {
        match self.last_trained_fingerprint {
            Some(fp) => fp != self.fingerprint(),
            None => false,
        }
    }
}
