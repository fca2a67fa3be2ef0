//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the inventory store.
//! - Resolve `DATABASE_URL`-style connection strings to a storage target.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every returned connection enforces foreign keys, so cascade and
//!   nullify rules are applied by the engine.
//! - Core code must not read/write inventory data before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_database_url, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection string does not name a SQLite target.
    UnsupportedDatabaseUrl(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UnsupportedDatabaseUrl(url) => write!(
                f,
                "unsupported database url `{url}`; expected sqlite://<path>, sqlite::memory: or a file path"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::UnsupportedDatabaseUrl(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Storage target resolved from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// SQLite database file.
    File(PathBuf),
    /// Private in-memory database, lost when the connection closes.
    Memory,
}

impl DatabaseTarget {
    /// Parses a `DATABASE_URL` value.
    ///
    /// Accepted forms: `sqlite::memory:`, `:memory:`, `sqlite://<path>`,
    /// `sqlite:<path>` and bare filesystem paths. URLs with any other
    /// scheme (`postgres://`, `mysql://`, ...) are rejected.
    pub fn parse(url: &str) -> DbResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(DbError::UnsupportedDatabaseUrl(url.to_string()));
        }

        if trimmed == "sqlite::memory:" || trimmed == ":memory:" {
            return Ok(Self::Memory);
        }

        let path = if let Some(rest) = trimmed.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = trimmed.strip_prefix("sqlite:") {
            rest
        } else if trimmed.contains("://") {
            return Err(DbError::UnsupportedDatabaseUrl(trimmed.to_string()));
        } else {
            trimmed
        };

        // Query parameters (`?mode=rwc`) are accepted and ignored.
        let path = path.split('?').next().unwrap_or_default();
        if path.is_empty() {
            return Err(DbError::UnsupportedDatabaseUrl(trimmed.to_string()));
        }

        Ok(Self::File(PathBuf::from(path)))
    }
}
