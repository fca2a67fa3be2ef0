//! Opening inventory databases.
//!
//! Every connection handed out has `foreign_keys=ON` and the latest schema,
//! so cascade and nullify rules are enforced by SQLite itself.

use super::migrations::apply_migrations;
use super::{DatabaseTarget, DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating when missing) a database file and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory database, mostly for tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

/// Opens the database named by a `DATABASE_URL` value.
///
/// See [`DatabaseTarget::parse`] for accepted forms.
pub fn open_database_url(url: &str) -> DbResult<Connection> {
    match DatabaseTarget::parse(url)? {
        DatabaseTarget::Memory => open_db_in_memory(),
        DatabaseTarget::File(path) => open_db(path),
    }
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let opened = open().map_err(DbError::from).and_then(|mut conn| {
        prepare(&mut conn)?;
        Ok(conn)
    });

    let duration_ms = started_at.elapsed().as_millis();
    match &opened {
        Ok(_) => info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error={err}"
        ),
    }
    opened
}

/// Enables FK enforcement, sets the lock wait, then migrates.
fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
