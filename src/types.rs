//! MOTORPOOL - Core Type Definitions
//! The vehicle record, its enumerations and the field rules every
//! construction and update goes through.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MotorpoolError, Result};

/// Dense primary key of a vehicle. Always in `1..=N`.
pub type VehicleId = u32;

/// Largest accepted `x` coordinate.
pub const MAX_X: i64 = 225;
/// Largest accepted `y` coordinate.
pub const MAX_Y: i32 = 493;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Boat,
    Chopper,
    Hoverboard,
    Spaceship,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Gasoline,
    Kerosene,
    Nuclear,
    Plasma,
}

impl VehicleType {
    pub const ALL: [VehicleType; 5] = [
        VehicleType::Boat,
        VehicleType::Chopper,
        VehicleType::Hoverboard,
        VehicleType::Spaceship,
        VehicleType::Auto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Boat => "BOAT",
            VehicleType::Chopper => "CHOPPER",
            VehicleType::Hoverboard => "HOVERBOARD",
            VehicleType::Spaceship => "SPACESHIP",
            VehicleType::Auto => "AUTO",
        }
    }
}

impl FuelType {
    pub const ALL: [FuelType; 4] = [
        FuelType::Gasoline,
        FuelType::Kerosene,
        FuelType::Nuclear,
        FuelType::Plasma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasoline => "GASOLINE",
            FuelType::Kerosene => "KEROSENE",
            FuelType::Nuclear => "NUCLEAR",
            FuelType::Plasma => "PLASMA",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = MotorpoolError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                MotorpoolError::validation(
                    "vehicle_type",
                    format!("'{}' is not one of {}", s.trim(), names(&Self::ALL)),
                )
            })
    }
}

impl FromStr for FuelType {
    type Err = MotorpoolError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                MotorpoolError::validation(
                    "fuel_type",
                    format!("'{}' is not one of {}", s.trim(), names(&Self::ALL)),
                )
            })
    }
}

fn names<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse an optional enum value. Blank input and `null` mean "absent".
pub fn parse_optional<T: FromStr<Err = MotorpoolError>>(input: &str) -> Result<Option<T>> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i64,
    pub y: i32,
}

impl Coordinates {
    pub fn new(x: i64, y: i32) -> Result<Self> {
        Ok(Self {
            x: validate_x(x)?,
            y: validate_y(y)?,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(MotorpoolError::validation("name", "must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_x(x: i64) -> Result<i64> {
    if !(0..=MAX_X).contains(&x) {
        return Err(MotorpoolError::validation(
            "x",
            format!("must be in 0..={}, got {}", MAX_X, x),
        ));
    }
    Ok(x)
}

pub fn validate_y(y: i32) -> Result<i32> {
    if !(0..=MAX_Y).contains(&y) {
        return Err(MotorpoolError::validation(
            "y",
            format!("must be in 0..={}, got {}", MAX_Y, y),
        ));
    }
    Ok(y)
}

pub fn validate_engine_power(power: f32) -> Result<f32> {
    if !power.is_finite() || power <= 0.0 {
        return Err(MotorpoolError::validation(
            "engine_power",
            format!("must be > 0, got {}", power),
        ));
    }
    Ok(power)
}

/// A vehicle stored in the registry.
///
/// The registry hands out clones; the stored copy is only replaced
/// through [`crate::collection::CollectionStore`], which keeps `id`
/// equal to the map key and never touches `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub coordinates: Coordinates,
    pub created_at: DateTime<Utc>,
    pub engine_power: f32,
    pub vehicle_type: Option<VehicleType>,
    pub fuel_type: Option<FuelType>,
    pub owner: String,
}

impl Vehicle {
    /// Build a validated vehicle from a draft, stamped now.
    pub fn new(id: VehicleId, owner: &str, draft: VehicleDraft) -> Result<Self> {
        Self::with_created_at(id, owner, draft, Utc::now())
    }

    /// Build a validated vehicle with an explicit creation instant
    /// (used when loading persisted records).
    pub fn with_created_at(
        id: VehicleId,
        owner: &str,
        draft: VehicleDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if id == 0 {
            return Err(MotorpoolError::validation("id", "must be > 0"));
        }
        if owner.trim().is_empty() {
            return Err(MotorpoolError::validation("owner", "must not be empty"));
        }
        Ok(Self {
            id,
            name: validate_name(&draft.name)?,
            coordinates: Coordinates::new(draft.x, draft.y)?,
            created_at,
            engine_power: validate_engine_power(draft.engine_power)?,
            vehicle_type: draft.vehicle_type,
            fuel_type: draft.fuel_type,
            owner: owner.to_string(),
        })
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} at {} power={} type={} fuel={} owner={} created={}",
            self.id,
            self.name,
            self.coordinates,
            self.engine_power,
            self.vehicle_type.map_or("null", |t| t.as_str()),
            self.fuel_type.map_or("null", |t| t.as_str()),
            self.owner,
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

/// Candidate for [`crate::collection::CollectionStore::add`]. Unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDraft {
    pub name: String,
    pub x: i64,
    pub y: i32,
    pub engine_power: f32,
    pub vehicle_type: Option<VehicleType>,
    pub fuel_type: Option<FuelType>,
}

impl VehicleDraft {
    pub fn new(name: impl Into<String>, x: i64, y: i32, engine_power: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            engine_power,
            vehicle_type: None,
            fuel_type: None,
        }
    }

    pub fn with_type(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = Some(vehicle_type);
        self
    }

    pub fn with_fuel(mut self, fuel_type: FuelType) -> Self {
        self.fuel_type = Some(fuel_type);
        self
    }
}

/// Field changes for an update. `None` leaves a field as it is; for the
/// optional enums `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePatch {
    pub name: Option<String>,
    pub x: Option<i64>,
    pub y: Option<i32>,
    pub engine_power: Option<f32>,
    pub vehicle_type: Option<Option<VehicleType>>,
    pub fuel_type: Option<Option<FuelType>>,
}

impl VehiclePatch {
    /// A patch that replaces every editable field with the draft's values.
    pub fn replace_with(draft: VehicleDraft) -> Self {
        Self {
            name: Some(draft.name),
            x: Some(draft.x),
            y: Some(draft.y),
            engine_power: Some(draft.engine_power),
            vehicle_type: Some(draft.vehicle_type),
            fuel_type: Some(draft.fuel_type),
        }
    }

    /// Produce the patched copy of `current`, stopping at the first
    /// invalid field. `current` is never modified.
    pub fn apply_to(&self, current: &Vehicle) -> Result<Vehicle> {
        let mut next = current.clone();
        if let Some(name) = &self.name {
            next.name = validate_name(name)?;
        }
        if let Some(x) = self.x {
            next.coordinates.x = validate_x(x)?;
        }
        if let Some(y) = self.y {
            next.coordinates.y = validate_y(y)?;
        }
        if let Some(power) = self.engine_power {
            next.engine_power = validate_engine_power(power)?;
        }
        if let Some(vehicle_type) = self.vehicle_type {
            next.vehicle_type = vehicle_type;
        }
        if let Some(fuel_type) = self.fuel_type {
            next.fuel_type = fuel_type;
        }
        Ok(next)
    }
}
