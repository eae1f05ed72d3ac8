//! Cash-in-transit vehicle with capacity and cost parameters.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Operational status of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    /// Ready for dispatch.
    Active,
    /// Broken down, in maintenance, or otherwise out of rotation.
    Unavailable,
}

/// A vehicle that carries cash from a depot to dispensers.
///
/// # Examples
///
/// ```
/// use cash_replen::models::Vehicle;
///
/// let v = Vehicle::new(0, "Van 1", 2_000_000.0);
/// assert_eq!(v.id(), 0);
/// assert!(v.is_active());
/// assert_eq!(v.cost_per_km(), 2.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    id: u32,
    name: String,
    capacity: f64,
    cost_per_km: f64,
    depot_id: u32,
    status: VehicleStatus,
    location: Option<GeoPoint>,
}

impl Vehicle {
    /// Creates an active vehicle with the given cash capacity.
    ///
    /// Defaults: depot 0, cost 2.0 per km, unknown current location.
    pub fn new(id: u32, name: impl Into<String>, capacity: f64) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            cost_per_km: 2.0,
            depot_id: 0,
            status: VehicleStatus::Active,
            location: None,
        }
    }

    /// Sets the assigned depot.
    pub fn with_depot(mut self, depot_id: u32) -> Self {
        self.depot_id = depot_id;
        self
    }

    /// Sets travel cost per kilometer.
    pub fn with_cost_per_km(mut self, cost: f64) -> Self {
        self.cost_per_km = cost;
        self
    }

    /// Sets the operational status.
    pub fn with_status(mut self, status: VehicleStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the last known location.
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Vehicle ID.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum cash load.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Travel cost per kilometer.
    pub fn cost_per_km(&self) -> f64 {
        self.cost_per_km
    }

    /// Assigned depot ID.
    pub fn depot_id(&self) -> u32 {
        self.depot_id
    }

    /// Operational status.
    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    /// Last known location, if reported.
    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    /// Returns `true` if the vehicle can be dispatched.
    pub fn is_active(&self) -> bool {
        self.status == VehicleStatus::Active
    }
}
