//! Catalog domain model.
//!
//! # Responsibility
//! - Define the book record shared by the store and the console session.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `BookId`.
//! - Deletion removes the row; there are no tombstones.

pub mod book;
