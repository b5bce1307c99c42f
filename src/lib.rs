//! MOTORPOOL - Vehicle Registry
//!
//! A multi-user registry of vehicles with a dense, reindexed key space and
//! an interactive command shell.
//!
//! ## Features
//! - **Dense keys**: ids are always exactly `1..=N`; removals reindex once
//! - **Ownership**: only the creating user may change or remove a vehicle
//! - **Persistence**: CRC32-framed bincode snapshots behind a `VehicleStore` trait
//! - **Commands**: a name → command registry with a bounded history
//! - **Scripts**: `execute_script` feeds a file through the same prompts,
//!   with `\stop_running_command` cancelling the current command
//! - **Concurrency**: `SharedCollection` wraps the store in Arc + RwLock
//!
//! ## Example
//! ```
//! use motorpool::collection::CollectionStore;
//! use motorpool::session::Session;
//! use motorpool::types::VehicleDraft;
//!
//! let mut store = CollectionStore::new();
//! let alice = Session::logged_in("alice");
//!
//! store.add(VehicleDraft::new("Bus", 10, 20, 150.0), &alice).unwrap();
//! store.add(VehicleDraft::new("Boat", 1, 2, 80.0), &alice).unwrap();
//! store.remove_by_id(1, &alice).unwrap();
//!
//! assert_eq!(store.get(1).map(|v| v.name.as_str()), Some("Boat"));
//! ```

pub mod collection;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod session;
pub mod shell;
pub mod storage;
pub mod types;
