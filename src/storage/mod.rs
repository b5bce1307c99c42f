//! MOTORPOOL - Persistent Store
//! The contract the registry persists through, plus the frame codec
//! shared by the file-backed stores.

pub mod file;
pub mod memory;

use crate::error::{MotorpoolError, Result};
use crate::types::{Vehicle, VehicleId};

/// Backing store for the vehicle registry.
///
/// Ids handed to `insert_one` are reassigned from the store's own
/// sequence, the way a database `nextval` default would.
pub trait VehicleStore {
    /// Load every persisted vehicle, ordered by persisted id.
    fn load_all(&mut self) -> Result<Vec<Vehicle>>;

    /// Persist one vehicle under the next sequence value. Returns that id.
    fn insert_one(&mut self, vehicle: &Vehicle) -> Result<VehicleId>;

    /// Remove every persisted vehicle.
    fn delete_all(&mut self) -> Result<()>;

    /// Take the next value of the id sequence.
    fn next_sequence_value(&mut self) -> Result<VehicleId>;

    /// Restart the id sequence at `start`.
    fn reset_sequence_start(&mut self, start: VehicleId) -> Result<()>;

    /// Replace the stored snapshot with `vehicles`.
    ///
    /// Not transactional: an error part way through leaves the store
    /// holding only the records inserted so far.
    fn save(&mut self, vehicles: &[Vehicle]) -> Result<()> {
        self.delete_all()?;
        self.reset_sequence_start(1)?;

        let mut ordered: Vec<&Vehicle> = vehicles.iter().collect();
        ordered.sort_by_key(|v| v.id);

        for vehicle in ordered {
            let stored_id = self.insert_one(vehicle)?;
            if stored_id != vehicle.id {
                log::warn!(
                    "vehicle {} persisted under id {} (collection was not dense)",
                    vehicle.id,
                    stored_id
                );
            }
        }
        Ok(())
    }
}

/// Encode one payload into the on-disk frame format.
///
/// ## Binary Format
/// ```text
/// [len: 4 bytes (LE)][payload: len bytes][crc: 4 bytes (LE), over len + payload]
/// ```
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 8);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    let crc = crc32fast::hash(&buf);
    buf.extend_from_slice(&crc.to_le_bytes());
    buf
}

/// Split a byte stream back into payloads, checking every CRC.
pub fn decode_frames(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut frames = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let header_end = pos + 4;
        if header_end > bytes.len() {
            return Err(MotorpoolError::Corruption(format!(
                "truncated frame header at offset {}",
                pos
            )));
        }
        let len = u32::from_le_bytes(read_u32(&bytes[pos..header_end])) as usize;
        let payload_end = header_end + len;
        let frame_end = payload_end + 4;
        if frame_end > bytes.len() {
            return Err(MotorpoolError::Corruption(format!(
                "truncated frame at offset {} ({} byte payload)",
                pos, len
            )));
        }

        let expected = u32::from_le_bytes(read_u32(&bytes[payload_end..frame_end]));
        let actual = crc32fast::hash(&bytes[pos..payload_end]);
        if expected != actual {
            return Err(MotorpoolError::Corruption(format!(
                "CRC mismatch at offset {}: expected {:08x}, got {:08x}",
                pos, expected, actual
            )));
        }

        frames.push(bytes[header_end..payload_end].to_vec());
        pos = frame_end;
    }

    Ok(frames)
}

fn read_u32(slice: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(slice);
    out
}
