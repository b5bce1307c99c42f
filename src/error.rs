//! MOTORPOOL - Custom Error Types
//! Defines the error hierarchy for the vehicle registry and its shell.

use thiserror::Error;

/// Custom Result type for Motorpool.
pub type Result<T> = std::result::Result<T, MotorpoolError>;

/// Error types for the registry, its stores and the command shell.
#[derive(Error, Debug)]
pub enum MotorpoolError {
    /// I/O errors from file operations (store files, scripts, terminal).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data corruption detected (CRC mismatch, truncated frame).
    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// A record field is out of range or empty.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The operation needs a logged-in user.
    #[error("Not logged in: log in to perform this operation")]
    Unauthenticated,

    /// The record belongs to somebody else.
    #[error("Vehicle {id} belongs to another user [{owner}]")]
    Unauthorized { id: u32, owner: String },

    /// No record under the given id.
    #[error("Vehicle {0} not found")]
    NotFound(u32),

    /// No command registered under the given name.
    #[error("Unknown command: '{0}'. Type 'help' for the list of commands")]
    UnknownCommand(String),

    /// A command argument could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `execute_script` refused to run the file.
    #[error("Script rejected: {0}")]
    ScriptRejected(String),

    /// Interactive input reached end of stream.
    #[error("Input closed")]
    InputClosed,

    /// Registration with a username that is taken.
    #[error("User '{0}' already exists")]
    UserExists(String),

    /// Wrong username or password.
    #[error("Login failed for user '{0}'")]
    LoginFailed(String),

    /// The persistent store could not be opened or reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MotorpoolError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<bincode::Error> for MotorpoolError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
