//! Catalog store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the `books` schema and the mapping between rows and `Book` values.
//! - Provide the five catalog operations over parameterized statements.
//!
//! # Invariants
//! - Write paths must call `BookDraft::validate()` before SQL mutations.
//! - Field values are always bound as parameters, never formatted into SQL.
//! - Each operation opens its own connection and drops it before returning.
//! - Missing rows on update/delete are reported as `false`, not as errors.
//! - Read paths fail only on type mismatches; text content is returned as stored.

use crate::config::StoreConfig;
use crate::db::schema::ensure_books_table;
use crate::db::{is_unavailable_sqlite, open_connection, DbError};
use crate::model::book::{Book, BookDraft, BookId, BookValidationError};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    quantity
FROM books
ORDER BY id ASC;";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure taxonomy for catalog store operations.
#[derive(Debug)]
pub enum StoreError {
    /// The database cannot be opened or reached.
    Unavailable(DbError),
    /// The schema could not be created or is not usable.
    Schema(DbError),
    /// Caller-supplied fields are malformed.
    Validation(BookValidationError),
    /// The database rejected an insert, update or delete.
    Write(rusqlite::Error),
    /// A persisted column holds a value of the wrong type for a `Book`.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "catalog database unavailable: {err}"),
            Self::Schema(err) => write!(f, "catalog schema error: {err}"),
            Self::Validation(err) => write!(f, "invalid book: {err}"),
            Self::Write(err) => write!(f, "catalog write rejected: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Write(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<BookValidationError> for StoreError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl StoreError {
    fn from_write(err: rusqlite::Error) -> Self {
        if is_unavailable_sqlite(&err) {
            Self::Unavailable(DbError::Sqlite(err))
        } else {
            Self::Write(err)
        }
    }

    fn from_read(err: rusqlite::Error) -> Self {
        match err {
            err if is_unavailable_sqlite(&err) => Self::Unavailable(DbError::Sqlite(err)),
            rusqlite::Error::InvalidColumnType(index, name, kind) => Self::InvalidData(format!(
                "column `{name}` (index {index}) holds unexpected type {kind}"
            )),
            rusqlite::Error::FromSqlConversionFailure(index, _, cause) => {
                Self::InvalidData(format!("column index {index} failed to convert: {cause}"))
            }
            other => Self::Schema(DbError::Sqlite(other)),
        }
    }

    fn from_schema(err: DbError) -> Self {
        if err.is_unavailable() {
            Self::Unavailable(err)
        } else {
            Self::Schema(err)
        }
    }

    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "store_unavailable",
            Self::Schema(_) => "schema_error",
            Self::Validation(_) => "validation_error",
            Self::Write(_) => "write_error",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

/// Repository interface for the book catalog.
pub trait BookRepository {
    /// Creates the `books` table when absent. Safe to call repeatedly.
    fn ensure_schema(&self) -> StoreResult<()>;
    /// Inserts a new row and returns its store-assigned id.
    fn add(&self, draft: &BookDraft) -> StoreResult<BookId>;
    /// Returns every row in id order.
    fn list(&self) -> StoreResult<Vec<Book>>;
    /// Overwrites the row with `id`; `false` when no such row exists.
    fn update(&self, id: BookId, draft: &BookDraft) -> StoreResult<bool>;
    /// Removes the row with `id`; `false` when no such row exists.
    fn delete(&self, id: BookId) -> StoreResult<bool>;
}

/// SQLite-backed catalog store.
#[derive(Debug, Clone)]
pub struct SqliteBookRepository {
    config: StoreConfig,
}

impl SqliteBookRepository {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Runs `op` on a freshly opened connection.
    ///
    /// The connection is dropped when this returns, whichever way `op` exits.
    fn with_connection<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&mut Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();

        let result = open_connection(&self.config)
            .map_err(StoreError::Unavailable)
            .and_then(|mut conn| op(&mut conn));

        match &result {
            Ok(_) => info!(
                "event={event} module=repo status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={event} module=repo status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }

        result
    }
}

impl BookRepository for SqliteBookRepository {
    fn ensure_schema(&self) -> StoreResult<()> {
        self.with_connection("schema_ensure", |conn| {
            let state = ensure_books_table(conn).map_err(StoreError::from_schema)?;
            info!(
                "event=schema_state module=repo version={} created_table={}",
                state.version, state.created_table
            );
            Ok(())
        })
    }

    fn add(&self, draft: &BookDraft) -> StoreResult<BookId> {
        draft.validate()?;

        self.with_connection("book_add", |conn| {
            conn.execute(
                "INSERT INTO books (title, author, quantity) VALUES (?1, ?2, ?3);",
                params![draft.title.as_str(), draft.author.as_str(), draft.quantity],
            )
            .map_err(StoreError::from_write)?;

            Ok(conn.last_insert_rowid())
        })
    }

    fn list(&self) -> StoreResult<Vec<Book>> {
        self.with_connection("book_list", |conn| {
            let mut stmt = conn
                .prepare(BOOK_SELECT_SQL)
                .map_err(StoreError::from_read)?;
            let mut rows = stmt.query([]).map_err(StoreError::from_read)?;
            let mut books = Vec::new();

            while let Some(row) = rows.next().map_err(StoreError::from_read)? {
                books.push(parse_book_row(row)?);
            }

            Ok(books)
        })
    }

    fn update(&self, id: BookId, draft: &BookDraft) -> StoreResult<bool> {
        draft.validate()?;

        self.with_connection("book_update", |conn| {
            let changed = conn
                .execute(
                    "UPDATE books
                     SET
                        title = ?1,
                        author = ?2,
                        quantity = ?3
                     WHERE id = ?4;",
                    params![
                        draft.title.as_str(),
                        draft.author.as_str(),
                        draft.quantity,
                        id
                    ],
                )
                .map_err(StoreError::from_write)?;

            Ok(changed > 0)
        })
    }

    fn delete(&self, id: BookId) -> StoreResult<bool> {
        self.with_connection("book_delete", |conn| {
            let changed = conn
                .execute("DELETE FROM books WHERE id = ?1;", [id])
                .map_err(StoreError::from_write)?;

            Ok(changed > 0)
        })
    }
}

/// Maps one row without write-side validation, so rows stored by other
/// tools (for instance an empty title) stay visible and fixable.
fn parse_book_row(row: &Row<'_>) -> StoreResult<Book> {
    Ok(Book {
        id: row.get("id").map_err(StoreError::from_read)?,
        title: row.get("title").map_err(StoreError::from_read)?,
        author: row.get("author").map_err(StoreError::from_read)?,
        quantity: row.get("quantity").map_err(StoreError::from_read)?,
    })
}
