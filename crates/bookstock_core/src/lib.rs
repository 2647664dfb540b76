//! Core catalog logic for bookstock.
//! This crate owns the book schema and every read/write against it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{Book, BookDraft, BookId, BookValidationError};
pub use repo::book_repo::{BookRepository, SqliteBookRepository, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
