//! Property/building/floor/room repository contracts and SQLite
//! implementation.
//!
//! # Responsibility
//! - Persist the ownership chain and its parent-scoped listings.
//! - Keep SQL details and ordering behavior inside repository boundary.
//!
//! # Invariants
//! - Floors list by `level_order ASC, name ASC, id ASC`.
//! - Other listings use insertion order (`created_at ASC, rowid ASC`).
//! - Deletes rely on `ON DELETE CASCADE`; one statement removes the subtree.

use crate::model::asset::AssetId;
use crate::model::hierarchy::{
    Building, BuildingFields, BuildingId, Floor, FloorFields, FloorId, Property, PropertyFields,
    PropertyId, Room, RoomFields, RoomId,
};
use crate::repo::error::{EntityKind, StoreError, StoreResult};
use crate::repo::{ensure_connection_ready, parse_optional_uuid, parse_uuid, NOW_MS_SQL};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PROPERTY_SELECT_SQL: &str = "SELECT id, name, address, created_at, updated_at FROM properties";
const BUILDING_SELECT_SQL: &str =
    "SELECT id, property_id, name, building_type, created_at, updated_at FROM buildings";
const FLOOR_SELECT_SQL: &str =
    "SELECT id, building_id, name, level_order, created_at, updated_at FROM floors";
const ROOM_SELECT_SQL: &str = "SELECT
    id,
    floor_id,
    name,
    description,
    reference_door_asset_id,
    created_at,
    updated_at
FROM rooms";

/// Repository interface for the ownership chain.
pub trait HierarchyRepository {
    fn create_property(&self, fields: &PropertyFields) -> StoreResult<Property>;
    fn get_property(&self, id: PropertyId) -> StoreResult<Option<Property>>;
    fn list_properties(&self) -> StoreResult<Vec<Property>>;
    fn update_property(&self, id: PropertyId, fields: &PropertyFields) -> StoreResult<Property>;
    fn delete_property(&self, id: PropertyId) -> StoreResult<()>;

    fn create_building(
        &self,
        property_id: PropertyId,
        fields: &BuildingFields,
    ) -> StoreResult<Building>;
    fn get_building(&self, id: BuildingId) -> StoreResult<Option<Building>>;
    fn list_buildings(&self, property_id: PropertyId) -> StoreResult<Vec<Building>>;
    fn update_building(&self, id: BuildingId, fields: &BuildingFields) -> StoreResult<Building>;
    fn delete_building(&self, id: BuildingId) -> StoreResult<()>;

    fn create_floor(&self, building_id: BuildingId, fields: &FloorFields) -> StoreResult<Floor>;
    fn get_floor(&self, id: FloorId) -> StoreResult<Option<Floor>>;
    fn list_floors(&self, building_id: BuildingId) -> StoreResult<Vec<Floor>>;
    fn update_floor(&self, id: FloorId, fields: &FloorFields) -> StoreResult<Floor>;
    fn delete_floor(&self, id: FloorId) -> StoreResult<()>;

    fn create_room(&self, floor_id: FloorId, fields: &RoomFields) -> StoreResult<Room>;
    fn get_room(&self, id: RoomId) -> StoreResult<Option<Room>>;
    fn list_rooms(&self, floor_id: FloorId) -> StoreResult<Vec<Room>>;
    fn update_room(&self, id: RoomId, fields: &RoomFields) -> StoreResult<Room>;
    /// Sets or clears the reference door. Door rules are checked by callers.
    fn set_reference_door(&self, id: RoomId, asset_id: Option<AssetId>) -> StoreResult<Room>;
    fn delete_room(&self, id: RoomId) -> StoreResult<()>;
}

/// SQLite-backed hierarchy repository.
pub struct SqliteHierarchyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHierarchyRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn require_changed(changed: usize, entity: EntityKind, id: Uuid) -> StoreResult<()> {
        if changed == 0 {
            return Err(StoreError::not_found(entity, id));
        }
        Ok(())
    }
}

impl HierarchyRepository for SqliteHierarchyRepository<'_> {
    fn create_property(&self, fields: &PropertyFields) -> StoreResult<Property> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO properties (id, name, address) VALUES (?1, ?2, ?3);",
            params![id.to_string(), fields.name, fields.address],
        )?;
        required(self.get_property(id)?, EntityKind::Property, id)
    }

    fn get_property(&self, id: PropertyId) -> StoreResult<Option<Property>> {
        query_optional(
            self.conn,
            &format!("{PROPERTY_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_property_row,
        )
    }

    fn list_properties(&self) -> StoreResult<Vec<Property>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROPERTY_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_property_row(row)?);
        }
        Ok(items)
    }

    fn update_property(&self, id: PropertyId, fields: &PropertyFields) -> StoreResult<Property> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE properties
                 SET name = ?2, address = ?3, updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), fields.name, fields.address],
        )?;
        Self::require_changed(changed, EntityKind::Property, id)?;
        required(self.get_property(id)?, EntityKind::Property, id)
    }

    fn delete_property(&self, id: PropertyId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM properties WHERE id = ?1;", [id.to_string()])?;
        Self::require_changed(changed, EntityKind::Property, id)
    }

    fn create_building(
        &self,
        property_id: PropertyId,
        fields: &BuildingFields,
    ) -> StoreResult<Building> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO buildings (id, property_id, name, building_type)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                property_id.to_string(),
                fields.name,
                fields.building_type,
            ],
        )?;
        required(self.get_building(id)?, EntityKind::Building, id)
    }

    fn get_building(&self, id: BuildingId) -> StoreResult<Option<Building>> {
        query_optional(
            self.conn,
            &format!("{BUILDING_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_building_row,
        )
    }

    fn list_buildings(&self, property_id: PropertyId) -> StoreResult<Vec<Building>> {
        query_list(
            self.conn,
            &format!(
                "{BUILDING_SELECT_SQL} WHERE property_id = ?1 ORDER BY created_at ASC, rowid ASC;"
            ),
            property_id,
            parse_building_row,
        )
    }

    fn update_building(&self, id: BuildingId, fields: &BuildingFields) -> StoreResult<Building> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE buildings
                 SET name = ?2, building_type = ?3, updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), fields.name, fields.building_type],
        )?;
        Self::require_changed(changed, EntityKind::Building, id)?;
        required(self.get_building(id)?, EntityKind::Building, id)
    }

    fn delete_building(&self, id: BuildingId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM buildings WHERE id = ?1;", [id.to_string()])?;
        Self::require_changed(changed, EntityKind::Building, id)
    }

    fn create_floor(&self, building_id: BuildingId, fields: &FloorFields) -> StoreResult<Floor> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO floors (id, building_id, name, level_order) VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                building_id.to_string(),
                fields.name,
                fields.level_order,
            ],
        )?;
        required(self.get_floor(id)?, EntityKind::Floor, id)
    }

    fn get_floor(&self, id: FloorId) -> StoreResult<Option<Floor>> {
        query_optional(
            self.conn,
            &format!("{FLOOR_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_floor_row,
        )
    }

    fn list_floors(&self, building_id: BuildingId) -> StoreResult<Vec<Floor>> {
        query_list(
            self.conn,
            &format!(
                "{FLOOR_SELECT_SQL} WHERE building_id = ?1 ORDER BY level_order ASC, name ASC, id ASC;"
            ),
            building_id,
            parse_floor_row,
        )
    }

    fn update_floor(&self, id: FloorId, fields: &FloorFields) -> StoreResult<Floor> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE floors
                 SET name = ?2, level_order = ?3, updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), fields.name, fields.level_order],
        )?;
        Self::require_changed(changed, EntityKind::Floor, id)?;
        required(self.get_floor(id)?, EntityKind::Floor, id)
    }

    fn delete_floor(&self, id: FloorId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM floors WHERE id = ?1;", [id.to_string()])?;
        Self::require_changed(changed, EntityKind::Floor, id)
    }

    fn create_room(&self, floor_id: FloorId, fields: &RoomFields) -> StoreResult<Room> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO rooms (id, floor_id, name, description, reference_door_asset_id)
             VALUES (?1, ?2, ?3, ?4, NULL);",
            params![
                id.to_string(),
                floor_id.to_string(),
                fields.name,
                fields.description,
            ],
        )?;
        required(self.get_room(id)?, EntityKind::Room, id)
    }

    fn get_room(&self, id: RoomId) -> StoreResult<Option<Room>> {
        query_optional(
            self.conn,
            &format!("{ROOM_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_room_row,
        )
    }

    fn list_rooms(&self, floor_id: FloorId) -> StoreResult<Vec<Room>> {
        query_list(
            self.conn,
            &format!("{ROOM_SELECT_SQL} WHERE floor_id = ?1 ORDER BY created_at ASC, rowid ASC;"),
            floor_id,
            parse_room_row,
        )
    }

    fn update_room(&self, id: RoomId, fields: &RoomFields) -> StoreResult<Room> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE rooms
                 SET name = ?2, description = ?3, updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), fields.name, fields.description],
        )?;
        Self::require_changed(changed, EntityKind::Room, id)?;
        required(self.get_room(id)?, EntityKind::Room, id)
    }

    fn set_reference_door(&self, id: RoomId, asset_id: Option<AssetId>) -> StoreResult<Room> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE rooms
                 SET reference_door_asset_id = ?2, updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![id.to_string(), asset_id.map(|value| value.to_string())],
        )?;
        Self::require_changed(changed, EntityKind::Room, id)?;
        required(self.get_room(id)?, EntityKind::Room, id)
    }

    fn delete_room(&self, id: RoomId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM rooms WHERE id = ?1;", [id.to_string()])?;
        Self::require_changed(changed, EntityKind::Room, id)
    }
}

fn required<T>(value: Option<T>, entity: EntityKind, id: Uuid) -> StoreResult<T> {
    value.ok_or_else(|| StoreError::not_found(entity, id))
}

fn query_optional<T>(
    conn: &Connection,
    sql: &str,
    id: Uuid,
    parse: fn(&Row<'_>) -> StoreResult<T>,
) -> StoreResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse(row)?));
    }
    Ok(None)
}

fn query_list<T>(
    conn: &Connection,
    sql: &str,
    parent_id: Uuid,
    parse: fn(&Row<'_>) -> StoreResult<T>,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([parent_id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

/// Returns whether a row with `id` exists in `table`.
pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: Uuid) -> StoreResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1;"),
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn parse_property_row(row: &Row<'_>) -> StoreResult<Property> {
    let id_text: String = row.get("id")?;
    Ok(Property {
        id: parse_uuid(&id_text, "properties.id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_building_row(row: &Row<'_>) -> StoreResult<Building> {
    let id_text: String = row.get("id")?;
    let property_text: String = row.get("property_id")?;
    Ok(Building {
        id: parse_uuid(&id_text, "buildings.id")?,
        property_id: parse_uuid(&property_text, "buildings.property_id")?,
        name: row.get("name")?,
        building_type: row.get("building_type")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_floor_row(row: &Row<'_>) -> StoreResult<Floor> {
    let id_text: String = row.get("id")?;
    let building_text: String = row.get("building_id")?;
    Ok(Floor {
        id: parse_uuid(&id_text, "floors.id")?,
        building_id: parse_uuid(&building_text, "floors.building_id")?,
        name: row.get("name")?,
        level_order: row.get("level_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_room_row(row: &Row<'_>) -> StoreResult<Room> {
    let id_text: String = row.get("id")?;
    let floor_text: String = row.get("floor_id")?;
    Ok(Room {
        id: parse_uuid(&id_text, "rooms.id")?,
        floor_id: parse_uuid(&floor_text, "rooms.floor_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        reference_door_asset_id: parse_optional_uuid(
            row.get("reference_door_asset_id")?,
            "rooms.reference_door_asset_id",
        )?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
