//! MOTORPOOL - In-Memory Vehicle Store
//! A [`VehicleStore`] that keeps its snapshot in a `Vec`. Nothing
//! survives the process.

use crate::error::Result;
use crate::types::{Vehicle, VehicleId};

use super::VehicleStore;

#[derive(Debug)]
pub struct MemoryStore {
    vehicles: Vec<Vehicle>,
    next_seq: VehicleId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            vehicles: Vec::new(),
            next_seq: 1,
        }
    }

    /// Start from an existing snapshot, ids taken as persisted.
    pub fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
        let next_seq = vehicles.iter().map(|v| v.id).max().unwrap_or(0) + 1;
        Self { vehicles, next_seq }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleStore for MemoryStore {
    fn load_all(&mut self) -> Result<Vec<Vehicle>> {
        let mut vehicles = self.vehicles.clone();
        vehicles.sort_by_key(|v| v.id);
        Ok(vehicles)
    }

    fn insert_one(&mut self, vehicle: &Vehicle) -> Result<VehicleId> {
        let id = self.next_sequence_value()?;
        self.vehicles.push(Vehicle {
            id,
            ..vehicle.clone()
        });
        Ok(id)
    }

    fn delete_all(&mut self) -> Result<()> {
        self.vehicles.clear();
        Ok(())
    }

    fn next_sequence_value(&mut self) -> Result<VehicleId> {
        let value = self.next_seq;
        self.next_seq += 1;
        Ok(value)
    }

    fn reset_sequence_start(&mut self, start: VehicleId) -> Result<()> {
        self.next_seq = start;
        Ok(())
    }
}
