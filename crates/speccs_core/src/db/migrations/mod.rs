//! Schema migrations for the inventory database.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one per step.
//! - All pending steps run in one transaction; the reached version is
//!   stored in `PRAGMA user_version` after each step.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One ordered schema step.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "inventory",
        sql: include_str!("0001_inventory.sql"),
    },
    SchemaStep {
        version: 2,
        name: "taxonomy_terms",
        sql: include_str!("0002_taxonomy_terms.sql"),
    },
];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Brings `conn` up to [`latest_version`].
///
/// Fails with `UnsupportedSchemaVersion` when the file was written by a
/// newer build; nothing is changed in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let pending: Vec<&SchemaStep> = STEPS.iter().filter(|step| step.version > from).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    for step in pending {
        info!(
            "event=schema_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    Ok(())
}

/// Schema version recorded in the database file (0 for a fresh file).
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, STEPS};

    #[test]
    fn steps_are_contiguous_from_one() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
        assert_eq!(latest_version(), STEPS.len() as u32);
    }

    #[test]
    fn step_scripts_are_not_empty() {
        assert!(STEPS.iter().all(|step| !step.sql.trim().is_empty()));
    }
}
