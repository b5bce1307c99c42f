//! MOTORPOOL - File-Backed Vehicle Store
//! Keeps the saved snapshot as CRC-framed bincode records and the id
//! sequence in a small side file.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{MotorpoolError, Result};
use crate::types::{Vehicle, VehicleId};

use super::{decode_frames, encode_frame, VehicleStore};

/// File-backed [`VehicleStore`].
///
/// ## Layout
/// ```text
/// <data_dir>/vehicles.db   one frame per vehicle, in insertion order
/// <data_dir>/vehicles.seq  next sequence value, 4 bytes (LE)
/// ```
pub struct FileStore {
    /// Path to the snapshot file.
    path: PathBuf,
    /// Path to the sequence file.
    seq_path: PathBuf,
    /// Snapshot file handle opened for appending.
    file: File,
    /// Next value `next_sequence_value` will hand out.
    next_seq: VehicleId,
    /// fsync after every write.
    sync_writes: bool,
}

impl FileStore {
    /// Open or create the store under the configured data directory.
    ///
    /// Any failure here means the registry cannot start, so it is
    /// reported as [`MotorpoolError::StoreUnavailable`].
    pub fn open(config: &Config) -> Result<Self> {
        config.ensure_dirs().map_err(|e| {
            MotorpoolError::StoreUnavailable(format!(
                "cannot create {}: {}",
                config.data_dir.display(),
                e
            ))
        })?;

        let path = config.vehicles_path();
        let seq_path = config.sequence_path();
        let file = open_append(&path).map_err(|e| {
            MotorpoolError::StoreUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        let next_seq = read_sequence(&seq_path)?;

        log::info!(
            "vehicle store opened at {:?} (next sequence value {})",
            config.data_dir,
            next_seq
        );

        Ok(Self {
            path,
            seq_path,
            file,
            next_seq,
            sync_writes: config.sync_writes,
        })
    }

    /// Returns the path to the snapshot file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn write_sequence(&self) -> Result<()> {
        fs::write(&self.seq_path, self.next_seq.to_le_bytes())?;
        Ok(())
    }
}

impl VehicleStore for FileStore {
    fn load_all(&mut self) -> Result<Vec<Vehicle>> {
        let bytes = fs::read(&self.path)?;
        let mut vehicles = decode_frames(&bytes)?
            .iter()
            .map(|frame| bincode::deserialize::<Vehicle>(frame).map_err(MotorpoolError::from))
            .collect::<Result<Vec<_>>>()?;
        vehicles.sort_by_key(|v| v.id);

        log::debug!("loaded {} vehicles from {:?}", vehicles.len(), self.path);
        Ok(vehicles)
    }

    fn insert_one(&mut self, vehicle: &Vehicle) -> Result<VehicleId> {
        let id = self.next_sequence_value()?;
        let stored = Vehicle {
            id,
            ..vehicle.clone()
        };
        let payload = bincode::serialize(&stored)?;
        self.file.write_all(&encode_frame(&payload))?;
        if self.sync_writes {
            self.file.sync_all()?;
        }
        Ok(id)
    }

    fn delete_all(&mut self) -> Result<()> {
        // Truncate, then reopen in append mode
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.file = open_append(&self.path)?;
        Ok(())
    }

    fn next_sequence_value(&mut self) -> Result<VehicleId> {
        let value = self.next_seq;
        self.next_seq += 1;
        self.write_sequence()?;
        Ok(value)
    }

    fn reset_sequence_start(&mut self, start: VehicleId) -> Result<()> {
        self.next_seq = start;
        self.write_sequence()
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn read_sequence(path: &Path) -> Result<VehicleId> {
    match fs::read(path) {
        Ok(bytes) => {
            let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                MotorpoolError::Corruption(format!(
                    "sequence file {} holds {} bytes, expected 4",
                    path.display(),
                    bytes.len()
                ))
            })?;
            Ok(VehicleId::from_le_bytes(raw).max(1))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(1),
        Err(e) => Err(e.into()),
    }
}
