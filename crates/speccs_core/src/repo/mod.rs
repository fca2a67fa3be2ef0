//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories never open transactions themselves; callers wrap
//!   multi-statement use cases so entity and journal writes commit together.
//! - Repository APIs return semantic errors (`NotFound`, constraint
//!   violations) in addition to DB transport errors.

pub mod asset_repo;
pub mod connection_repo;
pub mod error;
pub mod hierarchy_repo;
pub mod journal_repo;
pub mod taxonomy_repo;

use crate::db::migrations::{current_user_version, latest_version};
use error::{StoreError, StoreResult};
use rusqlite::Connection;
use uuid::Uuid;

/// SQL expression for the current time in epoch milliseconds.
pub(crate) const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> StoreResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

/// Verifies the connection is migrated and carries the required tables.
pub fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in [
        "properties",
        "buildings",
        "floors",
        "rooms",
        "assets",
        "connections",
        "journal_entries",
        "taxonomy_terms",
    ] {
        if !table_exists(conn, table)? {
            return Err(StoreError::InvalidData(format!(
                "inventory store requires table `{table}`"
            )));
        }
    }

    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    if foreign_keys != 1 {
        return Err(StoreError::InvalidData(
            "inventory store requires PRAGMA foreign_keys = ON".to_string(),
        ));
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
