//! Catalog store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract the console session drives.
//! - Isolate SQLite statement details from callers.
//!
//! # Invariants
//! - Repository writes must enforce `BookDraft::validate()` before persistence.
//! - Repository APIs never retry; failures surface to the caller immediately.

pub mod book_repo;
