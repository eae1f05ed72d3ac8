//! The read-only network snapshot a planning cycle works from.

use std::collections::HashMap;

use super::{Depot, Dispenser, Transaction, Vehicle};

/// Everything the storage collaborator hands over at the start of a planning
/// cycle: dispenser, depot, and vehicle snapshots plus per-dispenser
/// withdrawal history.
///
/// The core only reads this; balances are mutated by plan execution outside
/// the core.
///
/// # Examples
///
/// ```
/// use cash_replen::models::{Dispenser, GeoPoint, NetworkSnapshot};
///
/// let snap = NetworkSnapshot::new()
///     .with_dispenser(Dispenser::new(1, "A", GeoPoint::new(0.0, 0.0), 100.0, 40.0));
/// assert!(snap.dispenser(1).is_some());
/// assert!(snap.dispenser(2).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    dispensers: Vec<Dispenser>,
    depots: Vec<Depot>,
    vehicles: Vec<Vehicle>,
    history: HashMap<u32, Vec<Transaction>>,
}

impl NetworkSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a dispenser snapshot.
    pub fn with_dispenser(mut self, dispenser: Dispenser) -> Self {
        self.dispensers.push(dispenser);
        self
    }

    /// Adds a depot snapshot.
    pub fn with_depot(mut self, depot: Depot) -> Self {
        self.depots.push(depot);
        self
    }

    /// Adds a vehicle snapshot.
    pub fn with_vehicle(mut self, vehicle: Vehicle) -> Self {
        self.vehicles.push(vehicle);
        self
    }

    /// Attaches withdrawal history for a dispenser.
    pub fn with_history(mut self, dispenser_id: u32, transactions: Vec<Transaction>) -> Self {
        self.history.insert(dispenser_id, transactions);
        self
    }

    /// All dispensers.
    pub fn dispensers(&self) -> &[Dispenser] {
        &self.dispensers
    }

    /// All depots.
    pub fn depots(&self) -> &[Depot] {
        &self.depots
    }

    /// All vehicles.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Looks up a dispenser by ID.
    pub fn dispenser(&self, id: u32) -> Option<&Dispenser> {
        self.dispensers.iter().find(|d| d.id() == id)
    }

    /// Looks up a depot by ID.
    pub fn depot(&self, id: u32) -> Option<&Depot> {
        self.depots.iter().find(|d| d.id() == id)
    }

    /// Looks up a vehicle by ID.
    pub fn vehicle(&self, id: u32) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    /// Withdrawal history for a dispenser; empty if none was supplied.
    pub fn history(&self, dispenser_id: u32) -> &[Transaction] {
        self.history.get(&dispenser_id).map(Vec::as_slice).unwrap_or(&[])
    }
}
