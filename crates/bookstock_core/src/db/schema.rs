//! Catalog schema creation.
//!
//! # Responsibility
//! - Create the `books` table whenever it is absent.
//! - Stamp the schema version into `PRAGMA user_version`.
//!
//! # Invariants
//! - The recorded version is never trusted as proof that the table exists;
//!   the table DDL runs on every call and is a no-op when already present.
//! - A database stamped with a newer version than this binary is rejected
//!   before anything is written.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written by this binary. There is only the initial schema.
pub const SCHEMA_VERSION: u32 = 1;

const BOOKS_TABLE_SQL: &str = include_str!("books.sql");

/// Outcome of one schema check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaState {
    /// Version recorded in the database after the check.
    pub version: u32,
    /// Whether the `books` table had to be created by this call.
    pub created_table: bool,
}

/// Ensures the `books` table exists and the version stamp is current.
pub fn ensure_books_table(conn: &mut Connection) -> DbResult<SchemaState> {
    let recorded = current_user_version(conn)?;
    if recorded > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: recorded,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.transaction()?;
    let created_table = !table_exists(&tx, "books")?;
    tx.execute_batch(BOOKS_TABLE_SQL)?;
    if recorded != SCHEMA_VERSION {
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    tx.commit()?;

    Ok(SchemaState {
        version: SCHEMA_VERSION,
        created_table,
    })
}

/// Reads the schema version recorded in the database header.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn table_exists(conn: &Connection, name: &str) -> DbResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [name],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}
