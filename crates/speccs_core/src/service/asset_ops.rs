//! Asset lifecycle and journal operations on [`InventoryStore`].
//!
//! # Invariants
//! - Every asset mutation appends its journal entries in the same
//!   transaction as the row change.
//! - An asset that stops qualifying as a room's reference door (moved,
//!   retyped, soft-deleted or replaced) is cleared from that room.

use crate::model::asset::{Asset, AssetId};
use crate::model::attributes::Attributes;
use crate::model::journal::{JournalEntry, NewJournalEntry};
use crate::model::taxonomy::{AssetStatus, JournalAction};
use crate::model::validation::{normalize_optional_text, ValidationError};
use crate::repo::asset_repo::{AssetListQuery, AssetRepository, RoomScope, SqliteAssetRepository};
use crate::repo::error::{EntityKind, StoreError, StoreResult};
use crate::repo::journal_repo::{JournalRepository, SqliteJournalRepository};
use crate::service::inventory_store::{require_row, InventoryStore};
use log::debug;
use rusqlite::{params, Connection};
use uuid::Uuid;

impl InventoryStore<'_> {
    /// Creates an asset and journals `Create`.
    ///
    /// Storage assigns timestamps; any `created_at`/`updated_at` on the
    /// input is ignored.
    pub fn create_asset(&self, asset: &Asset) -> StoreResult<Asset> {
        let asset = normalize_asset(asset.clone());
        asset.validate()?;
        self.write("asset_create", |conn| {
            if let Some(room_id) = asset.room_id {
                require_row(conn, EntityKind::Room, room_id)?;
            }
            let created = SqliteAssetRepository::new(conn).insert_asset(&asset)?;
            self.journal(
                conn,
                NewJournalEntry::new(created.id, JournalAction::Create, &self.actor)
                    .detail("asset_type", created.asset_type.as_str()),
            )?;
            Ok(created)
        })
    }

    pub fn get_asset(&self, id: AssetId) -> StoreResult<Asset> {
        load_asset(self.conn, id)
    }

    /// Lists assets; `Deleted` rows are hidden unless the query asks for them.
    pub fn list_assets(&self, query: &AssetListQuery) -> StoreResult<Vec<Asset>> {
        if let RoomScope::Room(room_id) = query.room {
            require_row(self.conn, EntityKind::Room, room_id)?;
        }
        SqliteAssetRepository::new(self.conn).list_assets(query)
    }

    /// Replaces the editable fields of an existing asset.
    ///
    /// Journals `Update` with the comma-joined names of changed fields. An
    /// update that changes nothing writes nothing. Moving the status to
    /// `Deleted` is journaled as `Delete`, the same entry a soft delete writes.
    pub fn update_asset(&self, asset: &Asset) -> StoreResult<Asset> {
        let asset = normalize_asset(asset.clone());
        asset.validate()?;
        self.write("asset_update", |conn| {
            let existing = load_asset(conn, asset.id)?;
            if let Some(room_id) = asset.room_id {
                if asset.room_id != existing.room_id {
                    require_row(conn, EntityKind::Room, room_id)?;
                }
            }

            let deleting = asset.status.is_deleted() && !existing.status.is_deleted();
            let changed: Vec<&str> = asset
                .changed_fields(&existing)
                .into_iter()
                .filter(|field| !(deleting && *field == "status"))
                .collect();
            if changed.is_empty() && !deleting {
                debug!(
                    "event=asset_update module=store status=noop asset_id={}",
                    asset.id
                );
                return Ok(existing);
            }

            let updated = SqliteAssetRepository::new(conn).update_asset(&asset)?;
            release_stale_reference_doors(conn, &updated)?;
            if !changed.is_empty() {
                self.journal(
                    conn,
                    NewJournalEntry::new(updated.id, JournalAction::Update, &self.actor)
                        .detail("changed_fields", changed.join(",")),
                )?;
            }
            if deleting {
                self.journal(
                    conn,
                    NewJournalEntry::new(updated.id, JournalAction::Delete, &self.actor)
                        .detail("previous_status", existing.status.as_str()),
                )?;
            }
            Ok(updated)
        })
    }

    /// Sets the lifecycle status. `Deleted` behaves as [`Self::soft_delete_asset`].
    pub fn set_asset_status(&self, id: AssetId, status: AssetStatus) -> StoreResult<Asset> {
        if status.is_deleted() {
            return self.soft_delete_asset(id);
        }
        self.write("asset_status", |conn| {
            let existing = load_asset(conn, id)?;
            if existing.status == status {
                return Ok(existing);
            }
            SqliteAssetRepository::new(conn).set_status(id, &status)?;
            self.journal(
                conn,
                NewJournalEntry::new(id, JournalAction::Update, &self.actor)
                    .detail("changed_fields", "status"),
            )?;
            load_asset(conn, id)
        })
    }

    /// Marks the asset `Deleted` without removing the row.
    ///
    /// Already-deleted assets are returned unchanged.
    pub fn soft_delete_asset(&self, id: AssetId) -> StoreResult<Asset> {
        self.write("asset_soft_delete", |conn| {
            let existing = load_asset(conn, id)?;
            if existing.status.is_deleted() {
                return Ok(existing);
            }
            SqliteAssetRepository::new(conn).set_status(id, &AssetStatus::Deleted)?;
            clear_reference_door(conn, id)?;
            self.journal(
                conn,
                NewJournalEntry::new(id, JournalAction::Delete, &self.actor)
                    .detail("previous_status", existing.status.as_str()),
            )?;
            load_asset(conn, id)
        })
    }

    /// Installs `replacement` in place of `old_id`.
    ///
    /// The replacement inherits the old asset's room when it names none. The
    /// old asset becomes `Replaced`; both sides get a `Replace` entry and the
    /// new asset also gets `Create`. A room anchored on the old door moves to
    /// the replacement when it is a door in the same room.
    pub fn replace_asset(&self, old_id: AssetId, replacement: &Asset) -> StoreResult<Asset> {
        let mut replacement = normalize_asset(replacement.clone());
        replacement.status = AssetStatus::Active;
        self.write("asset_replace", |conn| {
            let old = load_asset(conn, old_id)?;
            if replacement.room_id.is_none() {
                replacement.room_id = old.room_id;
            }
            replacement.validate()?;
            if let Some(room_id) = replacement.room_id {
                require_row(conn, EntityKind::Room, room_id)?;
            }

            let assets = SqliteAssetRepository::new(conn);
            let created = assets.insert_asset(&replacement)?;
            assets.set_status(old_id, &AssetStatus::Replaced)?;

            if created.asset_type.is_door() && created.room_id.is_some() {
                conn.execute(
                    "UPDATE rooms
                     SET reference_door_asset_id = ?2
                     WHERE reference_door_asset_id = ?1 AND id = ?3;",
                    params![
                        old_id.to_string(),
                        created.id.to_string(),
                        created.room_id.map(|value| value.to_string()),
                    ],
                )?;
            }
            clear_reference_door(conn, old_id)?;

            self.journal(
                conn,
                NewJournalEntry::new(created.id, JournalAction::Create, &self.actor)
                    .detail("asset_type", created.asset_type.as_str()),
            )?;
            self.journal(
                conn,
                NewJournalEntry::new(created.id, JournalAction::Replace, &self.actor)
                    .detail("replaces", old_id.to_string()),
            )?;
            self.journal(
                conn,
                NewJournalEntry::new(old_id, JournalAction::Replace, &self.actor)
                    .detail("replaced_by", created.id.to_string()),
            )?;
            Ok(created)
        })
    }

    /// Physically deletes the asset with its connections and journal.
    ///
    /// Rooms referencing it as their door fall back to no reference; each
    /// peer of a removed connection gets an `Unlink` entry.
    pub fn purge_asset(&self, id: AssetId) -> StoreResult<()> {
        self.write("asset_purge", |conn| {
            self.journal_cascaded_unlinks(conn, &[id])?;
            SqliteAssetRepository::new(conn).purge_asset(id)
        })
    }

    /// Appends a caller-supplied journal entry.
    ///
    /// Only custom actions (`Inspect`, `Service`, ...) are accepted; built-in
    /// actions are written by the operations they describe.
    pub fn append_journal(
        &self,
        asset_id: AssetId,
        action: JournalAction,
        details: Attributes,
    ) -> StoreResult<JournalEntry> {
        if !matches!(action, JournalAction::Custom(_)) {
            let action = action.as_str().to_string();
            return Err(ValidationError::ReservedJournalAction(action).into());
        }
        self.write("journal_append", |conn| {
            require_row(conn, EntityKind::Asset, asset_id)?;
            let mut entry = NewJournalEntry::new(asset_id, action, &self.actor);
            entry.details = details;
            self.journal(conn, entry)
        })
    }

    /// Lists the asset's journal oldest first.
    pub fn list_journal(&self, asset_id: AssetId) -> StoreResult<Vec<JournalEntry>> {
        require_row(self.conn, EntityKind::Asset, asset_id)?;
        SqliteJournalRepository::new(self.conn).list_for_asset(asset_id)
    }

    pub(crate) fn journal(
        &self,
        conn: &Connection,
        entry: NewJournalEntry,
    ) -> StoreResult<JournalEntry> {
        let written = SqliteJournalRepository::new(conn).append(&entry)?;
        debug!(
            "event=journal_append module=store status=ok asset_id={} action={} actor={}",
            written.asset_id, written.action, written.actor
        );
        Ok(written)
    }
}

pub(crate) fn load_asset(conn: &Connection, id: AssetId) -> StoreResult<Asset> {
    SqliteAssetRepository::new(conn)
        .get_asset(id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Asset, id))
}

fn normalize_asset(mut asset: Asset) -> Asset {
    asset.name = normalize_optional_text(asset.name.as_deref());
    asset.description = normalize_optional_text(asset.description.as_deref());
    asset.install_date = normalize_optional_text(asset.install_date.as_deref());
    asset.wall_unit = normalize_optional_text(asset.wall_unit.as_deref());
    asset
}

fn clear_reference_door(conn: &Connection, asset_id: Uuid) -> StoreResult<()> {
    conn.execute(
        "UPDATE rooms
         SET reference_door_asset_id = NULL
         WHERE reference_door_asset_id = ?1;",
        [asset_id.to_string()],
    )?;
    Ok(())
}

/// Clears the reference from rooms the asset no longer anchors.
fn release_stale_reference_doors(conn: &Connection, asset: &Asset) -> StoreResult<()> {
    if !asset.asset_type.is_door() || asset.status.is_deleted() {
        return clear_reference_door(conn, asset.id);
    }
    conn.execute(
        "UPDATE rooms
         SET reference_door_asset_id = NULL
         WHERE reference_door_asset_id = ?1
           AND (?2 IS NULL OR id <> ?2);",
        params![asset.id.to_string(), asset.room_id.map(|value| value.to_string())],
    )?;
    Ok(())
}
