//! SQLite connection bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections from a `StoreConfig`.
//! - Create the catalog schema in a versioned, idempotent way.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Catalog rows must not be read or written before the schema exists.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod schema;
mod open;

pub use open::open_connection;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Whether this failure means the database itself cannot be reached or used.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Sqlite(err) => is_unavailable_sqlite(err),
            Self::UnsupportedSchemaVersion { .. } => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Classifies SQLite failures that point at the database file or its
/// availability rather than at the statement being run.
pub fn is_unavailable_sqlite(err: &rusqlite::Error) -> bool {
    use rusqlite::ErrorCode;

    matches!(
        err.sqlite_error_code(),
        Some(
            ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied
        )
    )
}
