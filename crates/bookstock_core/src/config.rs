//! Store connection configuration.
//!
//! # Responsibility
//! - Describe where the catalog database lives and how connections behave.
//! - Stay plain data so callers can build it from files, flags or tests.
//!
//! # Invariants
//! - `database_path` is never empty once `validate()` has passed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "bookstock.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Connection settings handed to the catalog store at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. Created on first use; its directory is not.
    pub database_path: PathBuf,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Builds a config for `database_path` with default connection settings.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Returns a human-readable error when the config cannot yield a connection.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_path.as_os_str().is_empty() {
            return Err("database_path cannot be empty".to_string());
        }
        Ok(())
    }
}
