//! Book domain model.
//!
//! # Responsibility
//! - Define the persisted catalog record and the caller-supplied field set.
//! - Provide the write-side validation shared by add and update paths.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `title` and `author` are non-empty on every persisted record.
//! - `quantity` is stored as given; negative counts are accepted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned surrogate key of a book row.
pub type BookId = i64;

/// Validation errors for caller-supplied book fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyTitle,
    EmptyAuthor,
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyAuthor => write!(f, "author must not be empty"),
        }
    }
}

impl Error for BookValidationError {}

/// Field values for creating or overwriting a book.
///
/// A draft never carries an id: creation gets one from the store and update
/// addresses the row separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    /// Number of physical copies. Not range-checked.
    pub quantity: i64,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, quantity: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            quantity,
        }
    }

    /// Checks the fields a write must carry.
    ///
    /// Whitespace-only text counts as empty. Values are not trimmed or
    /// otherwise rewritten.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }
        Ok(())
    }
}

/// Persisted catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub quantity: i64,
}

impl Book {
    /// Attaches a store-assigned id to a draft.
    pub fn from_draft(id: BookId, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            quantity: draft.quantity,
        }
    }

    /// Returns the writable fields of this record.
    pub fn draft(&self) -> BookDraft {
        BookDraft::new(self.title.clone(), self.author.clone(), self.quantity)
    }
}
