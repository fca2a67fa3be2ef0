//! Append-only journal repository.
//!
//! # Invariants
//! - The contract exposes inserts and reads only.
//! - A database trigger rejects any `UPDATE` of `journal_entries`; rows go
//!   away only through the asset cascade.
//! - Entries list oldest first (`recorded_at ASC, rowid ASC`).

use crate::model::asset::AssetId;
use crate::model::attributes::{bag_from_json, bag_to_json, details_schema, validate_bag};
use crate::model::journal::{JournalEntry, JournalEntryId, NewJournalEntry};
use crate::model::taxonomy::JournalAction;
use crate::model::validation::ValidationError;
use crate::repo::error::{EntityKind, StoreError, StoreResult};
use crate::repo::{ensure_connection_ready, parse_uuid};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const JOURNAL_SELECT_SQL: &str = "SELECT
    id,
    asset_id,
    action,
    actor,
    recorded_at,
    details
FROM journal_entries";

/// Repository interface for the audit journal.
pub trait JournalRepository {
    fn append(&self, entry: &NewJournalEntry) -> StoreResult<JournalEntry>;
    fn get_entry(&self, id: JournalEntryId) -> StoreResult<Option<JournalEntry>>;
    fn list_for_asset(&self, asset_id: AssetId) -> StoreResult<Vec<JournalEntry>>;
}

/// SQLite-backed journal repository.
pub struct SqliteJournalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn append(&self, entry: &NewJournalEntry) -> StoreResult<JournalEntry> {
        let actor = entry.actor.trim();
        if actor.is_empty() {
            return Err(ValidationError::BlankActor.into());
        }
        validate_bag(&entry.details, details_schema(&entry.action))?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO journal_entries (id, asset_id, action, actor, details)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                entry.asset_id.to_string(),
                entry.action.as_str(),
                actor,
                bag_to_json(&entry.details),
            ],
        )?;

        self.get_entry(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::JournalEntry, id))
    }

    fn get_entry(&self, id: JournalEntryId) -> StoreResult<Option<JournalEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{JOURNAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_journal_row(row)?));
        }
        Ok(None)
    }

    fn list_for_asset(&self, asset_id: AssetId) -> StoreResult<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{JOURNAL_SELECT_SQL} WHERE asset_id = ?1 ORDER BY recorded_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([asset_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_journal_row(row)?);
        }
        Ok(entries)
    }
}

fn parse_journal_row(row: &Row<'_>) -> StoreResult<JournalEntry> {
    let id_text: String = row.get("id")?;
    let asset_text: String = row.get("asset_id")?;
    let action_text: String = row.get("action")?;
    let action = JournalAction::parse(&action_text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid action `{action_text}` in journal_entries.action"
        ))
    })?;
    let details_text: String = row.get("details")?;
    let details = bag_from_json(&details_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid json in journal_entries.details: {err}"))
    })?;

    Ok(JournalEntry {
        id: parse_uuid(&id_text, "journal_entries.id")?,
        asset_id: parse_uuid(&asset_text, "journal_entries.asset_id")?,
        action,
        actor: row.get("actor")?,
        recorded_at: row.get("recorded_at")?,
        details,
    })
}
