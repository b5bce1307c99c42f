//! MOTORPOOL - Sequential Key Space
//! Keeps vehicle ids dense: after any removal the survivors are
//! renumbered `1..=N` in the order of their current ids.

use std::collections::BTreeMap;

use crate::types::{Vehicle, VehicleId};

/// True when the keys are exactly `1..=len`.
pub fn is_dense(map: &BTreeMap<VehicleId, Vehicle>) -> bool {
    map.keys().copied().eq(1..=map.len() as VehicleId)
}

/// The id the next added vehicle gets: current max + 1, or 1 when empty.
pub fn next_id(map: &BTreeMap<VehicleId, Vehicle>) -> VehicleId {
    map.keys().next_back().map_or(1, |max| max + 1)
}

/// Renumber the map in place. Returns false when it was already dense.
///
/// ## Algorithm
/// 1. Walk the survivors in ascending id order (BTreeMap order)
/// 2. Hand out `1, 2, 3, ...` in that order
/// 3. Rewrite each record's `id` to its new key
pub fn reindex(map: &mut BTreeMap<VehicleId, Vehicle>) -> bool {
    if is_dense(map) {
        return false;
    }

    let old = std::mem::take(map);
    for (new_id, (_, mut vehicle)) in (1..).zip(old) {
        vehicle.id = new_id;
        map.insert(new_id, vehicle);
    }
    true
}

/// Build a dense map from records as loaded from a store.
/// Records are ranked by their persisted id; ties keep input order.
pub fn rekey(mut records: Vec<Vehicle>) -> BTreeMap<VehicleId, Vehicle> {
    records.sort_by_key(|v| v.id);
    (1..)
        .zip(records)
        .map(|(id, mut vehicle)| {
            vehicle.id = id;
            (id, vehicle)
        })
        .collect()
}
