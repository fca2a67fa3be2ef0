//! Asset repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered listing over `assets` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Asset::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Soft delete is a status change; `purge_asset` is the only physical
//!   delete and cascades to connections and journal rows.

use crate::model::asset::{Asset, AssetId};
use crate::model::attributes::{bag_from_json, bag_to_json};
use crate::model::hierarchy::RoomId;
use crate::model::taxonomy::{AssetStatus, AssetType};
use crate::repo::error::{EntityKind, StoreError, StoreResult};
use crate::repo::{ensure_connection_ready, parse_optional_uuid, parse_uuid, NOW_MS_SQL};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ASSET_SELECT_SQL: &str = "SELECT
    id,
    room_id,
    asset_type,
    name,
    description,
    install_date,
    status,
    location_angle,
    location_height,
    location_depth,
    wall_length,
    wall_height,
    wall_unit,
    attributes,
    created_at,
    updated_at
FROM assets";

/// Room scope for asset listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoomScope {
    /// Assets in any room or none.
    #[default]
    Any,
    /// Assets in one room.
    Room(RoomId),
    /// Assets that are not room-scoped.
    Unassigned,
}

/// Query options for listing assets.
#[derive(Debug, Clone, Default)]
pub struct AssetListQuery {
    pub room: RoomScope,
    /// Matches the tag itself and every dotted descendant.
    pub type_prefix: Option<AssetType>,
    pub status: Option<AssetStatus>,
    /// When false, `Deleted` assets are hidden unless `status` asks for them.
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl AssetListQuery {
    pub fn in_room(room_id: RoomId) -> Self {
        Self {
            room: RoomScope::Room(room_id),
            ..Self::default()
        }
    }
}

/// Repository interface for asset persistence.
pub trait AssetRepository {
    fn insert_asset(&self, asset: &Asset) -> StoreResult<Asset>;
    fn update_asset(&self, asset: &Asset) -> StoreResult<Asset>;
    fn get_asset(&self, id: AssetId) -> StoreResult<Option<Asset>>;
    fn list_assets(&self, query: &AssetListQuery) -> StoreResult<Vec<Asset>>;
    fn set_status(&self, id: AssetId, status: &AssetStatus) -> StoreResult<()>;
    fn purge_asset(&self, id: AssetId) -> StoreResult<()>;
}

/// SQLite-backed asset repository.
pub struct SqliteAssetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssetRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AssetRepository for SqliteAssetRepository<'_> {
    fn insert_asset(&self, asset: &Asset) -> StoreResult<Asset> {
        asset.validate()?;

        self.conn.execute(
            "INSERT INTO assets (
                id,
                room_id,
                asset_type,
                name,
                description,
                install_date,
                status,
                location_angle,
                location_height,
                location_depth,
                wall_length,
                wall_height,
                wall_unit,
                attributes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                asset.id.to_string(),
                asset.room_id.map(|value| value.to_string()),
                asset.asset_type.as_str(),
                asset.name.as_deref(),
                asset.description.as_deref(),
                asset.install_date.as_deref(),
                asset.status.as_str(),
                asset.location_angle,
                asset.location_height,
                asset.location_depth,
                asset.wall_length,
                asset.wall_height,
                asset.wall_unit.as_deref(),
                bag_to_json(&asset.attributes),
            ],
        )?;

        self.get_asset(asset.id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Asset, asset.id))
    }

    fn update_asset(&self, asset: &Asset) -> StoreResult<Asset> {
        asset.validate()?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE assets
                 SET
                    room_id = ?2,
                    asset_type = ?3,
                    name = ?4,
                    description = ?5,
                    install_date = ?6,
                    status = ?7,
                    location_angle = ?8,
                    location_height = ?9,
                    location_depth = ?10,
                    wall_length = ?11,
                    wall_height = ?12,
                    wall_unit = ?13,
                    attributes = ?14,
                    updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                asset.id.to_string(),
                asset.room_id.map(|value| value.to_string()),
                asset.asset_type.as_str(),
                asset.name.as_deref(),
                asset.description.as_deref(),
                asset.install_date.as_deref(),
                asset.status.as_str(),
                asset.location_angle,
                asset.location_height,
                asset.location_depth,
                asset.wall_length,
                asset.wall_height,
                asset.wall_unit.as_deref(),
                bag_to_json(&asset.attributes),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::not_found(EntityKind::Asset, asset.id));
        }

        self.get_asset(asset.id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Asset, asset.id))
    }

    fn get_asset(&self, id: AssetId) -> StoreResult<Option<Asset>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSET_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_asset_row(row)?));
        }
        Ok(None)
    }

    fn list_assets(&self, query: &AssetListQuery) -> StoreResult<Vec<Asset>> {
        let mut sql = format!("{ASSET_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match query.room {
            RoomScope::Any => {}
            RoomScope::Room(room_id) => {
                sql.push_str(" AND room_id = ?");
                bind_values.push(Value::Text(room_id.to_string()));
            }
            RoomScope::Unassigned => sql.push_str(" AND room_id IS NULL"),
        }

        if let Some(prefix) = &query.type_prefix {
            sql.push_str(" AND (asset_type = ? OR substr(asset_type, 1, ?) = ?)");
            let dotted = format!("{}.", prefix.as_str());
            bind_values.push(Value::Text(prefix.as_str().to_string()));
            bind_values.push(Value::Integer(dotted.chars().count() as i64));
            bind_values.push(Value::Text(dotted));
        }

        match &query.status {
            Some(status) => {
                sql.push_str(" AND status = ?");
                bind_values.push(Value::Text(status.as_str().to_string()));
            }
            None if !query.include_deleted => {
                sql.push_str(" AND status <> ?");
                bind_values.push(Value::Text(AssetStatus::Deleted.as_str().to_string()));
            }
            None => {}
        }

        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut assets = Vec::new();
        while let Some(row) = rows.next()? {
            assets.push(parse_asset_row(row)?);
        }
        Ok(assets)
    }

    fn set_status(&self, id: AssetId, status: &AssetStatus) -> StoreResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE assets
                 SET status = ?2, updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), status.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(EntityKind::Asset, id));
        }
        Ok(())
    }

    fn purge_asset(&self, id: AssetId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM assets WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::not_found(EntityKind::Asset, id));
        }
        Ok(())
    }
}

fn parse_asset_row(row: &Row<'_>) -> StoreResult<Asset> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "assets.id")?;

    // Both columns are free-form; whatever is stored is readable.
    let asset_type = AssetType::from_stored(row.get("asset_type")?);
    let status = AssetStatus::from_stored(&row.get::<_, String>("status")?);

    let attributes_text: String = row.get("attributes")?;
    let attributes = bag_from_json(&attributes_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid json in assets.attributes: {err}"))
    })?;

    let asset = Asset {
        id,
        room_id: parse_optional_uuid(row.get("room_id")?, "assets.room_id")?,
        asset_type,
        name: row.get("name")?,
        description: row.get("description")?,
        install_date: row.get("install_date")?,
        status,
        location_angle: row.get("location_angle")?,
        location_height: row.get("location_height")?,
        location_depth: row.get("location_depth")?,
        wall_length: row.get("wall_length")?,
        wall_height: row.get("wall_height")?,
        wall_unit: row.get("wall_unit")?,
        attributes,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    asset.validate()?;
    Ok(asset)
}
