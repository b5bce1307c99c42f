//! MOTORPOOL - Sessions and User Accounts
//! The session is an explicit value handed to every mutating call;
//! the user directory checks credentials before one is opened.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::{MotorpoolError, Result};
use crate::storage::{decode_frames, encode_frame};

/// The user context mutating operations run under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    /// A session with nobody logged in.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// A session already logged in as `username`.
    pub fn logged_in(username: impl Into<String>) -> Self {
        Self {
            user: Some(username.into()),
        }
    }

    pub fn current_user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// The logged-in username, or `Unauthenticated`.
    pub fn require_user(&self) -> Result<&str> {
        self.current_user().ok_or(MotorpoolError::Unauthenticated)
    }

    pub fn login(&mut self, username: impl Into<String>) {
        self.user = Some(username.into());
    }

    /// Ends the session, returning who was logged in.
    pub fn logout(&mut self) -> Option<String> {
        self.user.take()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    username: String,
    password_hash: String,
}

/// Registered users, persisted as CRC-framed bincode records.
pub struct UserDirectory {
    path: Option<PathBuf>,
    users: BTreeMap<String, String>,
    sync_writes: bool,
}

impl UserDirectory {
    /// A directory that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            users: BTreeMap::new(),
            sync_writes: false,
        }
    }

    /// Open or create the directory file under the configured data dir.
    pub fn open(config: &Config) -> Result<Self> {
        config.ensure_dirs()?;
        let path = config.users_path();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut users = BTreeMap::new();
        for frame in decode_frames(&bytes)? {
            let record: UserRecord = bincode::deserialize(&frame)?;
            users.insert(record.username, record.password_hash);
        }
        log::info!("user directory opened at {:?} ({} users)", path, users.len());

        Ok(Self {
            path: Some(path),
            users,
            sync_writes: config.sync_writes,
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Add a user. Usernames are unique and non-empty.
    pub fn register(&mut self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(MotorpoolError::validation("username", "must not be empty"));
        }
        if password.is_empty() {
            return Err(MotorpoolError::validation("password", "must not be empty"));
        }
        if self.contains(username) {
            return Err(MotorpoolError::UserExists(username.to_string()));
        }

        let record = UserRecord {
            username: username.to_string(),
            password_hash: hash_password(password),
        };
        self.append(&record)?;
        self.users.insert(record.username, record.password_hash);
        log::info!("registered user '{}'", username);
        Ok(())
    }

    /// Check credentials and open `session` as that user.
    pub fn login(&self, session: &mut Session, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        match self.users.get(username) {
            Some(stored) if *stored == hash_password(password) => {
                session.login(username);
                log::info!("user '{}' logged in", username);
                Ok(())
            }
            _ => {
                log::warn!("failed login for '{}'", username);
                Err(MotorpoolError::LoginFailed(username.to_string()))
            }
        }
    }

    fn append(&self, record: &UserRecord) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let payload = bincode::serialize(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(&encode_frame(&payload))?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// base64(SHA-256(password)).
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    STANDARD.encode(digest)
}
