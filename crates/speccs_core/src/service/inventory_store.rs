//! Inventory store use-case service.
//!
//! # Responsibility
//! - Provide the public contract over all six entities plus the taxonomy
//!   registry.
//! - Validate parent existence and cross-entity rules above the
//!   repositories.
//! - Run every mutation in one IMMEDIATE transaction so the entity write and
//!   its journal entries commit or roll back together.
//!
//! # Invariants
//! - Missing parents surface as `NotFound` naming the parent kind.
//! - A room's reference door is an active `Door` asset located in that room.
//! - The journal is only ever appended to.

use crate::model::asset::AssetId;
use crate::model::hierarchy::{
    Building, BuildingFields, BuildingId, Floor, FloorFields, FloorId, Property, PropertyFields,
    PropertyId, Room, RoomFields, RoomId,
};
use crate::model::journal::DEFAULT_ACTOR;
use crate::model::taxonomy::TaxonomyCategory;
use crate::model::validation::ValidationError;
use crate::repo::asset_repo::{AssetRepository, SqliteAssetRepository};
use crate::repo::{ensure_connection_ready, parse_uuid};
use crate::repo::error::{ConstraintViolation, EntityKind, StoreError, StoreResult};
use crate::repo::hierarchy_repo::{row_exists, HierarchyRepository, SqliteHierarchyRepository};
use crate::repo::taxonomy_repo::{SqliteTaxonomyRepository, TaxonomyRepository, TaxonomyTerm};
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;
use uuid::Uuid;

/// Facade over one migrated SQLite connection.
pub struct InventoryStore<'conn> {
    pub(crate) conn: &'conn Connection,
    pub(crate) actor: String,
}

impl<'conn> InventoryStore<'conn> {
    /// Creates a store acting as [`DEFAULT_ACTOR`].
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            actor: DEFAULT_ACTOR.to_string(),
        })
    }

    /// Returns a store that records `actor` on journal entries.
    pub fn with_actor(mut self, actor: impl Into<String>) -> StoreResult<Self> {
        let actor = actor.into();
        let trimmed = actor.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankActor.into());
        }
        self.actor = trimmed.to_string();
        Ok(self)
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Runs `op` inside one IMMEDIATE transaction.
    ///
    /// Dropping the transaction on error rolls back every statement `op`
    /// issued, journal rows included.
    pub(crate) fn write<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        match op(&tx) {
            Ok(value) => {
                tx.commit()?;
                info!(
                    "event={} module=store status=ok actor={} duration_ms={}",
                    event,
                    self.actor,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event={} module=store status=error actor={} duration_ms={} error={}",
                    event,
                    self.actor,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    pub(crate) fn hierarchy(&self) -> SqliteHierarchyRepository<'conn> {
        SqliteHierarchyRepository::new(self.conn)
    }

    // Properties

    pub fn create_property(&self, fields: &PropertyFields) -> StoreResult<Property> {
        let fields = fields.normalized()?;
        self.write("property_create", |conn| {
            SqliteHierarchyRepository::new(conn).create_property(&fields)
        })
    }

    pub fn get_property(&self, id: PropertyId) -> StoreResult<Property> {
        self.hierarchy()
            .get_property(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Property, id))
    }

    pub fn list_properties(&self) -> StoreResult<Vec<Property>> {
        self.hierarchy().list_properties()
    }

    pub fn update_property(&self, id: PropertyId, fields: &PropertyFields) -> StoreResult<Property> {
        let fields = fields.normalized()?;
        self.write("property_update", |conn| {
            SqliteHierarchyRepository::new(conn).update_property(id, &fields)
        })
    }

    /// Deletes the property and, transitively, every building, floor, room,
    /// asset, connection and journal entry beneath it.
    pub fn delete_property(&self, id: PropertyId) -> StoreResult<()> {
        self.write("property_delete", |conn| {
            let doomed = contained_assets(conn, EntityKind::Property, id)?;
            self.journal_cascaded_unlinks(conn, &doomed)?;
            SqliteHierarchyRepository::new(conn).delete_property(id)
        })
    }

    // Buildings

    pub fn create_building(
        &self,
        property_id: PropertyId,
        fields: &BuildingFields,
    ) -> StoreResult<Building> {
        let fields = fields.normalized()?;
        self.write("building_create", |conn| {
            require_row(conn, EntityKind::Property, property_id)?;
            SqliteHierarchyRepository::new(conn).create_building(property_id, &fields)
        })
    }

    pub fn get_building(&self, id: BuildingId) -> StoreResult<Building> {
        self.hierarchy()
            .get_building(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Building, id))
    }

    pub fn list_buildings(&self, property_id: PropertyId) -> StoreResult<Vec<Building>> {
        require_row(self.conn, EntityKind::Property, property_id)?;
        self.hierarchy().list_buildings(property_id)
    }

    pub fn update_building(&self, id: BuildingId, fields: &BuildingFields) -> StoreResult<Building> {
        let fields = fields.normalized()?;
        self.write("building_update", |conn| {
            SqliteHierarchyRepository::new(conn).update_building(id, &fields)
        })
    }

    pub fn delete_building(&self, id: BuildingId) -> StoreResult<()> {
        self.write("building_delete", |conn| {
            let doomed = contained_assets(conn, EntityKind::Building, id)?;
            self.journal_cascaded_unlinks(conn, &doomed)?;
            SqliteHierarchyRepository::new(conn).delete_building(id)
        })
    }

    // Floors

    pub fn create_floor(&self, building_id: BuildingId, fields: &FloorFields) -> StoreResult<Floor> {
        let fields = fields.normalized()?;
        self.write("floor_create", |conn| {
            require_row(conn, EntityKind::Building, building_id)?;
            SqliteHierarchyRepository::new(conn).create_floor(building_id, &fields)
        })
    }

    pub fn get_floor(&self, id: FloorId) -> StoreResult<Floor> {
        self.hierarchy()
            .get_floor(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Floor, id))
    }

    /// Lists floors ordered by `level_order`, lowest first.
    pub fn list_floors(&self, building_id: BuildingId) -> StoreResult<Vec<Floor>> {
        require_row(self.conn, EntityKind::Building, building_id)?;
        self.hierarchy().list_floors(building_id)
    }

    pub fn update_floor(&self, id: FloorId, fields: &FloorFields) -> StoreResult<Floor> {
        let fields = fields.normalized()?;
        self.write("floor_update", |conn| {
            SqliteHierarchyRepository::new(conn).update_floor(id, &fields)
        })
    }

    pub fn delete_floor(&self, id: FloorId) -> StoreResult<()> {
        self.write("floor_delete", |conn| {
            let doomed = contained_assets(conn, EntityKind::Floor, id)?;
            self.journal_cascaded_unlinks(conn, &doomed)?;
            SqliteHierarchyRepository::new(conn).delete_floor(id)
        })
    }

    // Rooms

    pub fn create_room(&self, floor_id: FloorId, fields: &RoomFields) -> StoreResult<Room> {
        let fields = fields.normalized()?;
        self.write("room_create", |conn| {
            require_row(conn, EntityKind::Floor, floor_id)?;
            SqliteHierarchyRepository::new(conn).create_room(floor_id, &fields)
        })
    }

    pub fn get_room(&self, id: RoomId) -> StoreResult<Room> {
        self.hierarchy()
            .get_room(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Room, id))
    }

    pub fn list_rooms(&self, floor_id: FloorId) -> StoreResult<Vec<Room>> {
        require_row(self.conn, EntityKind::Floor, floor_id)?;
        self.hierarchy().list_rooms(floor_id)
    }

    pub fn update_room(&self, id: RoomId, fields: &RoomFields) -> StoreResult<Room> {
        let fields = fields.normalized()?;
        self.write("room_update", |conn| {
            SqliteHierarchyRepository::new(conn).update_room(id, &fields)
        })
    }

    /// Sets or clears the door anchoring the room's circular layout.
    ///
    /// # Errors
    /// - `NotFound` when the room or asset is missing.
    /// - `Constraint` when the asset is not a door, is outside the room, or
    ///   is soft-deleted.
    pub fn set_reference_door(
        &self,
        room_id: RoomId,
        asset_id: Option<AssetId>,
    ) -> StoreResult<Room> {
        self.write("room_reference_door", |conn| {
            let hierarchy = SqliteHierarchyRepository::new(conn);
            if hierarchy.get_room(room_id)?.is_none() {
                return Err(StoreError::not_found(EntityKind::Room, room_id));
            }

            if let Some(asset_id) = asset_id {
                let asset = SqliteAssetRepository::new(conn)
                    .get_asset(asset_id)?
                    .ok_or_else(|| StoreError::not_found(EntityKind::Asset, asset_id))?;
                if !asset.asset_type.is_door() {
                    return Err(ConstraintViolation::ReferenceDoorNotDoor {
                        room_id,
                        asset_id,
                        asset_type: asset.asset_type.as_str().to_string(),
                    }
                    .into());
                }
                if asset.room_id != Some(room_id) {
                    return Err(ConstraintViolation::ReferenceDoorOutsideRoom { room_id, asset_id }
                        .into());
                }
                if asset.status.is_deleted() {
                    return Err(
                        ConstraintViolation::ReferenceDoorInactive { room_id, asset_id }.into(),
                    );
                }
            }

            hierarchy.set_reference_door(room_id, asset_id)
        })
    }

    /// Deletes the room with its assets, their connections and journals.
    pub fn delete_room(&self, id: RoomId) -> StoreResult<()> {
        self.write("room_delete", |conn| {
            let doomed = contained_assets(conn, EntityKind::Room, id)?;
            self.journal_cascaded_unlinks(conn, &doomed)?;
            SqliteHierarchyRepository::new(conn).delete_room(id)
        })
    }

    // Taxonomy registry

    pub fn register_term(
        &self,
        category: TaxonomyCategory,
        tag: &str,
        description: &str,
    ) -> StoreResult<TaxonomyTerm> {
        self.write("taxonomy_register", |conn| {
            SqliteTaxonomyRepository::new(conn).register_term(category, tag, description)
        })
    }

    pub fn list_terms(&self, category: TaxonomyCategory) -> StoreResult<Vec<TaxonomyTerm>> {
        SqliteTaxonomyRepository::new(self.conn).list_terms(category)
    }

    pub fn is_registered(&self, category: TaxonomyCategory, tag: &str) -> StoreResult<bool> {
        SqliteTaxonomyRepository::new(self.conn).is_registered(category, tag)
    }
}

/// Ids of the assets placed anywhere under a hierarchy node.
fn contained_assets(conn: &Connection, scope: EntityKind, id: Uuid) -> StoreResult<Vec<AssetId>> {
    let filter = match scope {
        EntityKind::Room => "r.id = ?1",
        EntityKind::Floor => "r.floor_id = ?1",
        EntityKind::Building => "f.building_id = ?1",
        EntityKind::Property => "b.property_id = ?1",
        _ => return Ok(Vec::new()),
    };
    let sql = format!(
        "SELECT a.id
         FROM assets a
         JOIN rooms r ON r.id = a.room_id
         JOIN floors f ON f.id = r.floor_id
         JOIN buildings b ON b.id = f.building_id
         WHERE {filter}
         ORDER BY a.rowid;"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        ids.push(parse_uuid(&text, "assets.id")?);
    }
    Ok(ids)
}

/// Fails with `NotFound` unless the entity row exists.
pub(crate) fn require_row(conn: &Connection, entity: EntityKind, id: Uuid) -> StoreResult<()> {
    let table = match entity {
        EntityKind::Property => "properties",
        EntityKind::Building => "buildings",
        EntityKind::Floor => "floors",
        EntityKind::Room => "rooms",
        EntityKind::Asset => "assets",
        EntityKind::Connection => "connections",
        EntityKind::JournalEntry => "journal_entries",
    };
    if !row_exists(conn, table, id)? {
        return Err(StoreError::not_found(entity, id));
    }
    Ok(())
}
