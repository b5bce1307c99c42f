//! MOTORPOOL - Concurrent Collection Wrapper
//! Thread-safe wrapper around the collection store using Arc + RwLock.
//!
//! ## Concurrency Model
//! - **Read operations** (`list`, `get`, `len`, ...) acquire a **read lock** (shared)
//! - **Mutations** (`add`, `update`, every removal) acquire a **write lock** (exclusive)
//! - A removal and its reindex run under the same write lock, so readers
//!   never see a key space with gaps

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::session::Session;
use crate::storage::VehicleStore;
use crate::types::{Vehicle, VehicleDraft, VehicleId, VehiclePatch, VehicleType};

use super::metrics::CollectionMetrics;
use super::CollectionStore;

/// Thread-safe handle to a [`CollectionStore`]. Clones share the store.
///
/// ## Example
/// ```
/// use motorpool::collection::concurrent::SharedCollection;
/// use motorpool::session::Session;
/// use motorpool::types::VehicleDraft;
/// use std::thread;
///
/// let shared = SharedCollection::new();
/// let writer = shared.clone();
///
/// thread::spawn(move || {
///     let alice = Session::logged_in("alice");
///     writer.add(VehicleDraft::new("Bus", 1, 1, 90.0), &alice).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(shared.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct SharedCollection {
    inner: Arc<RwLock<CollectionStore>>,
}

impl SharedCollection {
    pub fn new() -> Self {
        Self::from_store(CollectionStore::new())
    }

    pub fn from_store(store: CollectionStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Add a vehicle (write lock).
    pub fn add(&self, draft: VehicleDraft, session: &Session) -> Result<VehicleId> {
        self.inner.write().add(draft, session)
    }

    /// Update a vehicle (write lock).
    pub fn update(&self, id: VehicleId, patch: &VehiclePatch, session: &Session) -> Result<()> {
        self.inner.write().update(id, patch, session)
    }

    /// Remove by id and reindex (write lock).
    pub fn remove_by_id(&self, id: VehicleId, session: &Session) -> Result<Vehicle> {
        self.inner.write().remove_by_id(id, session)
    }

    pub fn remove_ids_below(&self, threshold: VehicleId, session: &Session) -> Result<usize> {
        self.inner.write().remove_ids_below(threshold, session)
    }

    pub fn remove_where_engine_power_greater_than(
        &self,
        value: f32,
        session: &Session,
    ) -> Result<usize> {
        self.inner
            .write()
            .remove_where_engine_power_greater_than(value, session)
    }

    pub fn remove_where_type(
        &self,
        vehicle_type: Option<VehicleType>,
        session: &Session,
    ) -> Result<usize> {
        self.inner.write().remove_where_type(vehicle_type, session)
    }

    pub fn clear_owned_by(&self, username: &str) -> usize {
        self.inner.write().clear_owned_by(username)
    }

    /// Snapshot of all vehicles (read lock).
    pub fn list(&self) -> Vec<Vehicle> {
        self.inner.read().list()
    }

    pub fn get(&self, id: VehicleId) -> Option<Vehicle> {
        self.inner.read().get(id).cloned()
    }

    pub fn filter_and_sort<P, C>(&self, predicate: P, comparator: C) -> Vec<Vehicle>
    where
        P: Fn(&Vehicle) -> bool,
        C: FnMut(&Vehicle, &Vehicle) -> Ordering,
    {
        self.inner.read().filter_and_sort(predicate, comparator)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Save a consistent snapshot (read lock held for the whole write).
    pub fn save(&self, backend: &mut dyn VehicleStore) -> Result<()> {
        self.inner.read().save(backend)
    }

    /// Run `f` against the metrics within the read lock scope.
    pub fn with_metrics<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CollectionMetrics) -> R,
    {
        let store = self.inner.read();
        f(store.metrics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn draft(i: usize) -> VehicleDraft {
        VehicleDraft::new(format!("v{}", i), 1, 1, (i + 1) as f32)
    }

    fn is_dense(vehicles: &[Vehicle]) -> bool {
        vehicles
            .iter()
            .enumerate()
            .all(|(i, v)| v.id as usize == i + 1)
    }

    #[test]
    fn test_clone_and_share() {
        let shared = SharedCollection::new();
        let other = shared.clone();
        other.add(draft(0), &Session::logged_in("alice")).unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared.get(1).unwrap().owner, "alice");
    }

    #[test]
    fn test_concurrent_writers() {
        let shared = SharedCollection::new();
        let mut handles = vec![];

        for t in 0..4 {
            let shared = shared.clone();
            handles.push(thread::spawn(move || {
                let session = Session::logged_in(format!("user{}", t));
                for i in 0..25 {
                    shared.add(draft(i), &session).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let all = shared.list();
        assert_eq!(all.len(), 100);
        assert!(is_dense(&all));
    }

    #[test]
    fn test_readers_never_see_gaps() {
        let shared = SharedCollection::new();
        let alice = Session::logged_in("alice");
        for i in 0..200 {
            shared.add(draft(i), &alice).unwrap();
        }

        let mut readers = vec![];
        for _ in 0..4 {
            let shared = shared.clone();
            readers.push(thread::spawn(move || {
                for _ in 0..50 {
                    assert!(is_dense(&shared.list()));
                }
            }));
        }

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                let alice = Session::logged_in("alice");
                for _ in 0..20 {
                    shared.remove_by_id(1, &alice).unwrap();
                }
                shared
                    .remove_where_engine_power_greater_than(150.0, &alice)
                    .unwrap();
            })
        };

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert!(is_dense(&shared.list()));
    }

    #[test]
    fn test_metrics_access() {
        let shared = SharedCollection::new();
        shared.add(draft(0), &Session::logged_in("alice")).unwrap();
        shared.with_metrics(|metrics| {
            assert_eq!(metrics.total_mutations(), 1);
        });
    }
}
