//! Console entry point for the book catalog.
//!
//! # Responsibility
//! - Resolve configuration from file, flags and environment.
//! - Create the catalog schema before any menu is shown.
//! - Run the interactive session on stdin/stdout.
//!
//! # Usage
//!
//! ```bash
//! bookstock -d /srv/library/catalog.db
//! BOOKSTOCK_LOG_DIR=/var/log/bookstock bookstock
//! bookstock -c bookstock.json
//! ```

use bookstock_core::{
    default_log_level, init_logging, BookRepository, SqliteBookRepository, StoreConfig,
    StoreError,
};
use clap::Parser;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod render;
mod session;

use config::CliConfig;
use session::Session;

/// Menu-driven inventory manager for a library book catalog
#[derive(Parser, Debug)]
#[command(name = "bookstock", version, about)]
struct Args {
    /// SQLite database file holding the catalog
    #[arg(short = 'd', long, env = "BOOKSTOCK_DATABASE", value_name = "PATH")]
    database: Option<PathBuf>,

    /// Milliseconds to wait on a locked database
    #[arg(long, env = "BOOKSTOCK_BUSY_TIMEOUT_MS", value_name = "MS")]
    busy_timeout_ms: Option<u64>,

    /// JSON configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, env = "BOOKSTOCK_LOG_DIR", value_name = "DIR")]
    log_dir: Option<String>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, env = "BOOKSTOCK_LOG_LEVEL", value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = &config.log_dir {
        let level = config.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match run_catalog(config.store, stdin.lock(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Why a `bookstock` run ended abnormally.
#[derive(Debug)]
enum RunError {
    /// The catalog schema could not be initialized; no menu was shown.
    Startup { path: PathBuf, source: StoreError },
    /// Reading operator input or writing output failed.
    Console(io::Error),
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Startup { path, source } => write!(
                f,
                "cannot initialize catalog at `{}`: {source}",
                path.display()
            ),
            Self::Console(err) => write!(f, "console I/O failed: {err}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Startup { source, .. } => Some(source),
            Self::Console(err) => Some(err),
        }
    }
}

/// Initializes the schema, then runs the menu session until Exit.
fn run_catalog(
    store: StoreConfig,
    input: impl BufRead,
    output: impl Write,
) -> Result<(), RunError> {
    let repo = SqliteBookRepository::new(store);
    if let Err(source) = repo.ensure_schema() {
        error!(
            "event=startup module=cli status=error error_code={}",
            source.code()
        );
        return Err(RunError::Startup {
            path: repo.config().database_path.clone(),
            source,
        });
    }
    info!(
        "event=startup module=cli status=ok version={}",
        bookstock_core::core_version()
    );

    Session::new(repo, input, output).run().map_err(|err| {
        error!("event=session module=cli status=error error={err}");
        RunError::Console(err)
    })
}

fn load_config(args: &Args) -> Result<CliConfig, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    if let Some(database) = &args.database {
        config.store.database_path = database.clone();
    }
    if let Some(busy_timeout_ms) = args.busy_timeout_ms {
        config.store.busy_timeout_ms = busy_timeout_ms;
    }
    if let Some(log_dir) = &args.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(log_level) = &args.log_level {
        config.log_level = Some(log_level.clone());
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{load_config, run_catalog, Args, RunError};
    use bookstock_core::{StoreConfig, StoreError};
    use clap::Parser;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn unreachable_catalog_fails_before_menu_is_shown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("catalog.db");
        let mut output = Vec::new();

        let err = run_catalog(
            StoreConfig::new(&path),
            Cursor::new("5\n"),
            &mut output,
        )
        .unwrap_err();

        match &err {
            RunError::Startup { path: failed, source } => {
                assert_eq!(failed, &path);
                assert!(matches!(source, StoreError::Unavailable(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("cannot initialize catalog at"));
        assert!(output.is_empty());
    }

    #[test]
    fn reachable_catalog_runs_session_until_exit() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = Vec::new();

        run_catalog(
            StoreConfig::new(dir.path().join("catalog.db")),
            Cursor::new("1\nDune\nHerbert\n3\n5\n"),
            &mut output,
        )
        .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Book added successfully (id 1)."));
        assert!(text.ends_with("Exiting... Goodbye!\n"));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookstock.json");
        std::fs::write(
            &path,
            r#"{ "store": { "database_path": "/from/file.db", "busy_timeout_ms": 10 } }"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            "bookstock",
            "-c",
            path.to_str().unwrap(),
            "-d",
            "/from/flag.db",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();

        assert_eq!(config.store.database_path, PathBuf::from("/from/flag.db"));
        assert_eq!(config.store.busy_timeout_ms, 10);
    }

    #[test]
    fn empty_database_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookstock.json");
        std::fs::write(&path, r#"{ "store": { "database_path": "" } }"#).unwrap();

        let args = Args::try_parse_from(["bookstock", "-c", path.to_str().unwrap()]).unwrap();
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("database_path"));
    }
}
