//! Cash depot (vault) snapshot.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A cash vault vehicles load from before a replenishment run.
///
/// Balances are read-only here; only plan execution (an external
/// collaborator) decrements them.
///
/// # Examples
///
/// ```
/// use cash_replen::models::{Depot, GeoPoint};
///
/// let v = Depot::new(1, "Main Vault", GeoPoint::new(12.95, 77.60), 10_000_000.0, 7_500_000.0);
/// assert_eq!(v.id(), 1);
/// assert!(v.balance() <= v.capacity());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Depot {
    id: u32,
    name: String,
    location: GeoPoint,
    capacity: f64,
    balance: f64,
}

impl Depot {
    /// Creates a depot snapshot.
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
        }
    }

    /// Depot ID.
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depot_accessors() {
        let v = Depot::new(3, "North Vault", GeoPoint::new(1.0, 2.0), 5e6, 4e6);
        assert_eq!(v.id(), 3);
        assert_eq!(v.name(), "North Vault");
        assert_eq!(v.capacity(), 5e6);
        assert_eq!(v.balance(), 4e6);
    }
}
