//! MOTORPOOL - Collection Store
//! The in-memory registry of vehicles. Every public call returns with
//! the key set equal to `1..=len`.

pub mod concurrent;
pub mod guard;
pub mod keyspace;
pub mod metrics;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{MotorpoolError, Result};
use crate::session::Session;
use crate::storage::VehicleStore;
use crate::types::{Vehicle, VehicleDraft, VehicleId, VehiclePatch, VehicleType};

use self::metrics::CollectionMetrics;

/// Single source of truth for the vehicles of one process.
///
/// ## Invariants
/// - keys are exactly `1..=len()`
/// - `vehicle.id` equals the key it is stored under
/// - only the owner's session changes or removes a vehicle
///
/// The backing map is never handed out; reads return clones or `&Vehicle`.
pub struct CollectionStore {
    vehicles: BTreeMap<VehicleId, Vehicle>,
    initialized_at: DateTime<Utc>,
    metrics: CollectionMetrics,
}

impl CollectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            vehicles: BTreeMap::new(),
            initialized_at: Utc::now(),
            metrics: CollectionMetrics::new(),
        }
    }

    /// Create a store from persisted records, renumbering them densely.
    pub fn from_records(records: Vec<Vehicle>) -> Self {
        let loaded = records.len();
        let vehicles = keyspace::rekey(records);
        log::info!("collection initialized with {} vehicles", loaded);
        Self {
            vehicles,
            ..Self::new()
        }
    }

    /// Load everything the backing store holds.
    pub fn load(backend: &mut dyn VehicleStore) -> Result<Self> {
        Ok(Self::from_records(backend.load_all()?))
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn initialized_at(&self) -> DateTime<Utc> {
        self.initialized_at
    }

    pub fn metrics(&self) -> &CollectionMetrics {
        &self.metrics
    }

    /// Number of vehicles owned by `username`.
    pub fn count_owned_by(&self, username: &str) -> usize {
        self.vehicles.values().filter(|v| v.owner == username).count()
    }

    /// Add a vehicle owned by the session user. Returns its id.
    pub fn add(&mut self, draft: VehicleDraft, session: &Session) -> Result<VehicleId> {
        let owner = session.require_user()?;
        let id = keyspace::next_id(&self.vehicles);
        let vehicle =
            Vehicle::new(id, owner, draft).inspect_err(|_| self.metrics.record_rejection())?;

        log::debug!("vehicle {} added by '{}'", id, owner);
        self.vehicles.insert(id, vehicle);
        self.metrics.record_add();
        Ok(id)
    }

    /// Apply `patch` to the vehicle under `id`. All fields are validated
    /// before anything is written.
    pub fn update(&mut self, id: VehicleId, patch: &VehiclePatch, session: &Session) -> Result<()> {
        let current = self.vehicles.get(&id).ok_or(MotorpoolError::NotFound(id))?;
        let replacement = guard::authorize(current, session)
            .and_then(|()| patch.apply_to(current))
            .inspect_err(|_| self.metrics.record_rejection())?;

        self.vehicles.insert(id, replacement);
        self.metrics.record_update();
        log::debug!("vehicle {} updated", id);
        Ok(())
    }

    /// Remove the vehicle under `id` and close the gap.
    pub fn remove_by_id(&mut self, id: VehicleId, session: &Session) -> Result<Vehicle> {
        let current = self.vehicles.get(&id).ok_or(MotorpoolError::NotFound(id))?;
        guard::authorize(current, session).inspect_err(|_| self.metrics.record_rejection())?;

        let removed = self.vehicles.remove(&id).ok_or(MotorpoolError::NotFound(id))?;
        self.metrics.record_removals(1);
        self.reindex();
        Ok(removed)
    }

    /// Remove the session user's vehicles with `id < threshold`.
    pub fn remove_ids_below(&mut self, threshold: VehicleId, session: &Session) -> Result<usize> {
        self.remove_owned_where(session, |v| v.id < threshold)
    }

    /// Remove the session user's vehicles with `engine_power > value`.
    pub fn remove_where_engine_power_greater_than(
        &mut self,
        value: f32,
        session: &Session,
    ) -> Result<usize> {
        self.remove_owned_where(session, |v| v.engine_power > value)
    }

    /// Remove the session user's vehicles of the given type; `None`
    /// matches vehicles without a type.
    pub fn remove_where_type(
        &mut self,
        vehicle_type: Option<VehicleType>,
        session: &Session,
    ) -> Result<usize> {
        self.remove_owned_where(session, |v| v.vehicle_type == vehicle_type)
    }

    /// Remove every vehicle owned by `username`.
    pub fn clear_owned_by(&mut self, username: &str) -> usize {
        self.remove_where(|v| v.owner == username)
    }

    /// All vehicles ordered by id.
    pub fn list(&self) -> Vec<Vehicle> {
        self.vehicles.values().cloned().collect()
    }

    /// Vehicles matching `predicate`, ordered by `comparator`.
    /// Does not touch the store or its ids.
    pub fn filter_and_sort<P, C>(&self, predicate: P, mut comparator: C) -> Vec<Vehicle>
    where
        P: Fn(&Vehicle) -> bool,
        C: FnMut(&Vehicle, &Vehicle) -> Ordering,
    {
        let mut selected: Vec<Vehicle> = self
            .vehicles
            .values()
            .filter(|v| predicate(v))
            .cloned()
            .collect();
        selected.sort_by(|a, b| comparator(a, b));
        selected
    }

    /// Write the current snapshot to `backend`. The in-memory state is
    /// left as it is whether or not the write succeeds.
    pub fn save(&self, backend: &mut dyn VehicleStore) -> Result<()> {
        backend.save(&self.list())?;
        self.metrics.record_save();
        log::info!("saved {} vehicles", self.len());
        Ok(())
    }

    fn remove_owned_where<F>(&mut self, session: &Session, predicate: F) -> Result<usize>
    where
        F: Fn(&Vehicle) -> bool,
    {
        let user = session.require_user()?;
        Ok(self.remove_where(|v| v.owner == user && predicate(v)))
    }

    /// Drop every match, then reindex once.
    fn remove_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Vehicle) -> bool,
    {
        let before = self.vehicles.len();
        self.vehicles.retain(|_, v| !predicate(v));
        let removed = before - self.vehicles.len();

        if removed > 0 {
            self.metrics.record_removals(removed);
            self.reindex();
        }
        removed
    }

    fn reindex(&mut self) {
        if keyspace::reindex(&mut self.vehicles) {
            self.metrics.record_reindex();
            log::debug!("reindexed collection to 1..={}", self.vehicles.len());
        }
    }
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}
