//! Connection acquisition for the catalog database.
//!
//! # Responsibility
//! - Open one SQLite connection per store operation.
//! - Apply the connection settings carried by `StoreConfig`.
//!
//! # Invariants
//! - Returned connections have the configured busy timeout.
//! - Opening never creates missing parent directories.

use super::DbResult;
use crate::config::StoreConfig;
use log::{debug, error};
use rusqlite::Connection;
use std::time::Instant;

/// Opens a connection to the configured database file.
///
/// The caller owns the connection; dropping it closes the handle.
///
/// # Side effects
/// - Creates the database file when it does not exist yet.
/// - Emits `db_open` logging events with duration and status.
pub fn open_connection(config: &StoreConfig) -> DbResult<Connection> {
    let started_at = Instant::now();

    let conn = match Connection::open(&config.database_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    if let Err(err) = conn.busy_timeout(config.busy_timeout()) {
        error!(
            "event=db_open module=db status=error duration_ms={} error_code=db_configure_failed error={}",
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err.into());
    }

    debug!(
        "event=db_open module=db status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}
