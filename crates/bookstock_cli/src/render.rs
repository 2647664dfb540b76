//! Fixed-width catalog table output.

use bookstock_core::Book;
use std::io::{self, Write};

const ID_WIDTH: usize = 5;
const TITLE_WIDTH: usize = 30;
const AUTHOR_WIDTH: usize = 30;
const QUANTITY_WIDTH: usize = 10;

/// Writes the header, a dashed rule, then one line per book.
///
/// Columns are padded, never truncated; long values push later columns right.
pub fn write_book_table(out: &mut impl Write, books: &[Book]) -> io::Result<()> {
    writeln!(
        out,
        "{:<ID_WIDTH$} {:<TITLE_WIDTH$} {:<AUTHOR_WIDTH$} {:<QUANTITY_WIDTH$}",
        "ID", "Title", "Author", "Quantity"
    )?;
    writeln!(
        out,
        "{}",
        "-".repeat(ID_WIDTH + TITLE_WIDTH + AUTHOR_WIDTH + QUANTITY_WIDTH + 3)
    )?;

    if books.is_empty() {
        writeln!(out, "No books in the catalog.")?;
        return Ok(());
    }

    for book in books {
        writeln!(
            out,
            "{:<ID_WIDTH$} {:<TITLE_WIDTH$} {:<AUTHOR_WIDTH$} {:<QUANTITY_WIDTH$}",
            book.id, book.title, book.author, book.quantity
        )?;
    }
    Ok(())
}
