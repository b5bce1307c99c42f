//! MOTORPOOL - Configuration
//! Defines tunable parameters for the registry and its shell.

use std::path::PathBuf;

use crate::error::{MotorpoolError, Result};

/// Configuration for a Motorpool instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for all data files (vehicles, sequence, users).
    pub data_dir: PathBuf,

    /// Whether to sync store writes to disk immediately (fsync).
    pub sync_writes: bool,

    /// How many command names the shell history keeps.
    pub history_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            sync_writes: true,
            history_capacity: 8,
        }
    }
}

impl Config {
    /// Create a new Config with a custom data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Enable or disable fsync after every store write.
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Set the number of command names kept in the history.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Reject settings the shell cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(MotorpoolError::Config(
                "history capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }

    pub fn vehicles_path(&self) -> PathBuf {
        self.data_dir.join("vehicles.db")
    }

    pub fn sequence_path(&self) -> PathBuf {
        self.data_dir.join("vehicles.seq")
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.db")
    }
}
