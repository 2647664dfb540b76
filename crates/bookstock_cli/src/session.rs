//! Menu-driven console session over a catalog store.
//!
//! The session has a single waiting state: read a menu choice, run at most one
//! store call, report the outcome, and wait again. Store failures are printed
//! and never end the loop; only Exit or end of input does.

use crate::render::write_book_table;
use bookstock_core::{BookDraft, BookRepository, StoreError};
use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};

const MENU: &str = "\nLibrary Management System
1. Add Book
2. View Books
3. Update Book
4. Delete Book
5. Exit
Choose an option: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    View,
    Update,
    Delete,
    Exit,
}

/// Menu input that does not name one of the five entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidChoice(pub String);

impl Display for InvalidChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid menu choice `{}`", self.0)
    }
}

impl MenuChoice {
    pub fn parse(input: &str) -> Result<Self, InvalidChoice> {
        match input.trim() {
            "1" => Ok(Self::Add),
            "2" => Ok(Self::View),
            "3" => Ok(Self::Update),
            "4" => Ok(Self::Delete),
            "5" => Ok(Self::Exit),
            other => Err(InvalidChoice(other.to_string())),
        }
    }
}

/// What the loop does after a prompt or an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Exit,
}

pub struct Session<R, I, O> {
    repo: R,
    input: I,
    output: O,
}

impl<R: BookRepository, I: BufRead, O: Write> Session<R, I, O> {
    pub fn new(repo: R, input: I, output: O) -> Self {
        Self {
            repo,
            input,
            output,
        }
    }

    /// Runs until Exit is chosen or input ends.
    ///
    /// Only console I/O failures are returned; store failures are reported
    /// to the operator and the loop goes on.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let line = match self.prompt(MENU)? {
                Some(line) => line,
                None => break,
            };

            let step = match MenuChoice::parse(&line) {
                Ok(choice) => {
                    debug!("event=menu_choice module=session choice={choice:?}");
                    self.dispatch(choice)?
                }
                Err(invalid) => {
                    debug!("event=menu_choice module=session status=invalid");
                    writeln!(self.output, "Invalid choice `{}`. Try again.", invalid.0)?;
                    Step::Continue
                }
            };

            if step == Step::Exit {
                break;
            }
        }

        writeln!(self.output, "Exiting... Goodbye!")?;
        self.output.flush()
    }

    /// Hands back the owned parts, mainly so callers can inspect output.
    pub fn into_parts(self) -> (R, I, O) {
        (self.repo, self.input, self.output)
    }

    fn dispatch(&mut self, choice: MenuChoice) -> io::Result<Step> {
        match choice {
            MenuChoice::Add => self.add_book(),
            MenuChoice::View => self.view_books(),
            MenuChoice::Update => self.update_book(),
            MenuChoice::Delete => self.delete_book(),
            MenuChoice::Exit => Ok(Step::Exit),
        }
    }

    fn add_book(&mut self) -> io::Result<Step> {
        let draft = match self.read_draft("Enter title: ", "Enter author: ", "Enter quantity: ")? {
            Ok(draft) => draft,
            Err(step) => return Ok(step),
        };

        match self.repo.add(&draft) {
            Ok(id) => writeln!(self.output, "Book added successfully (id {id}).")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }

    fn view_books(&mut self) -> io::Result<Step> {
        match self.repo.list() {
            Ok(books) => write_book_table(&mut self.output, &books)?,
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }

    fn update_book(&mut self) -> io::Result<Step> {
        let id = match self.read_number("Enter book ID to update: ")? {
            Ok(id) => id,
            Err(step) => return Ok(step),
        };
        let draft = match self.read_draft(
            "Enter new title: ",
            "Enter new author: ",
            "Enter new quantity: ",
        )? {
            Ok(draft) => draft,
            Err(step) => return Ok(step),
        };

        match self.repo.update(id, &draft) {
            Ok(true) => writeln!(self.output, "Book updated successfully.")?,
            Ok(false) => writeln!(self.output, "Book ID not found.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }

    fn delete_book(&mut self) -> io::Result<Step> {
        let id = match self.read_number("Enter book ID to delete: ")? {
            Ok(id) => id,
            Err(step) => return Ok(step),
        };

        match self.repo.delete(id) {
            Ok(true) => writeln!(self.output, "Book deleted successfully.")?,
            Ok(false) => writeln!(self.output, "Book ID not found.")?,
            Err(err) => self.report(&err)?,
        }
        Ok(Step::Continue)
    }

    fn read_draft(
        &mut self,
        title_prompt: &str,
        author_prompt: &str,
        quantity_prompt: &str,
    ) -> io::Result<Result<BookDraft, Step>> {
        let Some(title) = self.prompt(title_prompt)? else {
            return Ok(Err(Step::Exit));
        };
        let Some(author) = self.prompt(author_prompt)? else {
            return Ok(Err(Step::Exit));
        };
        let quantity = match self.read_number(quantity_prompt)? {
            Ok(quantity) => quantity,
            Err(step) => return Ok(Err(step)),
        };
        Ok(Ok(BookDraft::new(title, author, quantity)))
    }

    /// Reads an integer. A malformed value is reported and abandons the
    /// current operation (`Err(Step::Continue)`).
    fn read_number(&mut self, prompt: &str) -> io::Result<Result<i64, Step>> {
        let Some(raw) = self.prompt(prompt)? else {
            return Ok(Err(Step::Exit));
        };
        match raw.trim().parse::<i64>() {
            Ok(value) => Ok(Ok(value)),
            Err(_) => {
                writeln!(self.output, "Invalid number `{}`. Operation cancelled.", raw.trim())?;
                Ok(Err(Step::Continue))
            }
        }
    }

    /// Writes `text`, then reads one line without its terminator.
    /// `None` means input is exhausted.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn report(&mut self, err: &StoreError) -> io::Result<()> {
        warn!(
            "event=operation_failed module=session error_code={}",
            err.code()
        );
        writeln!(self.output, "Error: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidChoice, MenuChoice, Session};
    use bookstock_core::{
        Book, BookDraft, BookId, BookRepository, SqliteBookRepository, StoreConfig, StoreError,
        StoreResult,
    };
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;

    /// In-memory stand-in for the SQLite store.
    #[derive(Default)]
    struct FakeRepo {
        books: RefCell<Vec<Book>>,
        next_id: Cell<BookId>,
        calls: Cell<usize>,
        broken: bool,
    }

    impl FakeRepo {
        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn check(&self) -> StoreResult<()> {
            self.calls.set(self.calls.get() + 1);
            if self.broken {
                return Err(StoreError::InvalidData("fake outage".to_string()));
            }
            Ok(())
        }
    }

    impl BookRepository for FakeRepo {
        fn ensure_schema(&self) -> StoreResult<()> {
            self.check()
        }

        fn add(&self, draft: &BookDraft) -> StoreResult<BookId> {
            self.check()?;
            draft.validate()?;
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            self.books
                .borrow_mut()
                .push(Book::from_draft(id, draft.clone()));
            Ok(id)
        }

        fn list(&self) -> StoreResult<Vec<Book>> {
            self.check()?;
            Ok(self.books.borrow().clone())
        }

        fn update(&self, id: BookId, draft: &BookDraft) -> StoreResult<bool> {
            self.check()?;
            draft.validate()?;
            let mut books = self.books.borrow_mut();
            match books.iter_mut().find(|book| book.id == id) {
                Some(book) => {
                    *book = Book::from_draft(id, draft.clone());
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn delete(&self, id: BookId) -> StoreResult<bool> {
            self.check()?;
            let mut books = self.books.borrow_mut();
            let before = books.len();
            books.retain(|book| book.id != id);
            Ok(books.len() < before)
        }
    }

    fn run_session<R: BookRepository>(repo: R, script: &str) -> (R, String) {
        let mut session = Session::new(repo, Cursor::new(script.to_string()), Vec::new());
        session.run().unwrap();
        let (repo, _, output) = session.into_parts();
        (repo, String::from_utf8(output).unwrap())
    }

    #[test]
    fn parse_accepts_only_menu_numbers() {
        assert_eq!(MenuChoice::parse(" 1 "), Ok(MenuChoice::Add));
        assert_eq!(MenuChoice::parse("5\n"), Ok(MenuChoice::Exit));
        assert_eq!(
            MenuChoice::parse("6"),
            Err(InvalidChoice("6".to_string()))
        );
        assert!(MenuChoice::parse("").is_err());
        assert!(MenuChoice::parse("add").is_err());
        assert!(MenuChoice::parse("01").is_err());
    }

    #[test]
    fn add_then_view_prints_table() {
        let (repo, output) = run_session(
            FakeRepo::default(),
            "1\nDune\nFrank Herbert\n3\n2\n5\n",
        );

        assert!(output.contains("Book added successfully (id 1)."));
        assert!(output.contains("Dune"));
        assert!(output.contains("Frank Herbert"));
        assert!(output.ends_with("Exiting... Goodbye!\n"));
        assert_eq!(repo.books.borrow()[0].title, "Dune");
    }

    #[test]
    fn update_and_delete_report_found_and_missing() {
        let (repo, output) = run_session(
            FakeRepo::default(),
            "1\nDune\nHerbert\n3\n3\n1\nDune\nHerbert\n5\n3\n42\nX\nY\n1\n4\n42\n4\n1\n5\n",
        );

        assert!(output.contains("Book updated successfully."));
        assert_eq!(output.matches("Book ID not found.").count(), 2);
        assert!(output.contains("Book deleted successfully."));
        assert!(repo.books.borrow().is_empty());
    }

    #[test]
    fn invalid_choice_warns_without_store_call() {
        let (repo, output) = run_session(FakeRepo::default(), "9\nhello\n5\n");

        assert!(output.contains("Invalid choice `9`. Try again."));
        assert!(output.contains("Invalid choice `hello`. Try again."));
        assert_eq!(repo.calls.get(), 0);
    }

    #[test]
    fn malformed_number_cancels_operation() {
        let (repo, output) = run_session(
            FakeRepo::default(),
            "1\nDune\nHerbert\nthree\n4\nabc\n5\n",
        );

        assert!(output.contains("Invalid number `three`. Operation cancelled."));
        assert!(output.contains("Invalid number `abc`. Operation cancelled."));
        assert_eq!(repo.calls.get(), 0);
    }

    #[test]
    fn store_errors_are_printed_and_loop_continues() {
        let (repo, output) = run_session(FakeRepo::broken(), "2\n4\n1\n2\n5\n");

        assert_eq!(output.matches("Error: ").count(), 3);
        assert!(output.contains("fake outage"));
        assert!(output.ends_with("Exiting... Goodbye!\n"));
        assert_eq!(repo.calls.get(), 3);
    }

    #[test]
    fn validation_errors_are_reported() {
        let (repo, output) = run_session(FakeRepo::default(), "1\n\nHerbert\n1\n5\n");

        assert!(output.contains("Error: invalid book: title must not be empty"));
        assert!(repo.books.borrow().is_empty());
    }

    #[test]
    fn end_of_input_ends_session_mid_operation() {
        let (repo, output) = run_session(FakeRepo::default(), "1\nDune\n");

        assert!(output.ends_with("Exiting... Goodbye!\n"));
        assert_eq!(repo.calls.get(), 0);
    }

    #[test]
    fn windows_line_endings_are_stripped() {
        let (repo, _) = run_session(FakeRepo::default(), "1\r\nDune\r\nHerbert\r\n2\r\n5\r\n");
        assert_eq!(
            repo.books.borrow()[0].draft(),
            BookDraft::new("Dune", "Herbert", 2)
        );
    }

    #[test]
    fn session_drives_sqlite_store_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteBookRepository::new(StoreConfig::new(dir.path().join("catalog.db")));
        repo.ensure_schema().unwrap();

        let (repo, output) = run_session(
            repo,
            "1\n'); DROP TABLE books; --\nHerbert\n3\n3\n1\nDune\nHerbert\n5\n2\n5\n",
        );

        assert!(output.contains("Book added successfully (id 1)."));
        assert!(output.contains("Book updated successfully."));
        assert_eq!(
            repo.list().unwrap(),
            vec![Book::from_draft(1, BookDraft::new("Dune", "Herbert", 5))]
        );
    }
}
