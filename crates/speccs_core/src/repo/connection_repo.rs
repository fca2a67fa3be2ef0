//! Asset connection graph repository.
//!
//! # Invariants
//! - Edge listings are deterministic: `created_at ASC, rowid ASC`.
//! - Both endpoints cascade-delete with their asset; no orphan edges.

use crate::model::asset::AssetId;
use crate::model::connection::{Connection, ConnectionId, Direction, NewConnection};
use crate::model::taxonomy::ConnectionType;
use crate::repo::error::{EntityKind, StoreError, StoreResult};
use crate::repo::{ensure_connection_ready, parse_uuid};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use uuid::Uuid;

const CONNECTION_SELECT_SQL: &str = "SELECT
    id,
    from_asset_id,
    to_asset_id,
    connection_type,
    notes,
    created_at
FROM connections";

/// Repository interface for connection edges.
pub trait ConnectionRepository {
    fn insert_connection(&self, input: &NewConnection) -> StoreResult<Connection>;
    fn get_connection(&self, id: ConnectionId) -> StoreResult<Option<Connection>>;
    fn delete_connection(&self, id: ConnectionId) -> StoreResult<()>;
    /// Lists edges touching `asset_id` in the given direction.
    fn list_edges(
        &self,
        asset_id: AssetId,
        direction: Direction,
        connection_type: Option<&ConnectionType>,
    ) -> StoreResult<Vec<Connection>>;
}

/// SQLite-backed connection repository.
pub struct SqliteConnectionRepository<'conn> {
    conn: &'conn rusqlite::Connection,
}

impl<'conn> SqliteConnectionRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn rusqlite::Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn rusqlite::Connection) -> Self {
        Self { conn }
    }
}

impl ConnectionRepository for SqliteConnectionRepository<'_> {
    fn insert_connection(&self, input: &NewConnection) -> StoreResult<Connection> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO connections (id, from_asset_id, to_asset_id, connection_type, notes)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                input.from_asset_id.to_string(),
                input.to_asset_id.to_string(),
                input.connection_type.as_str(),
                input.notes.as_deref(),
            ],
        )?;
        self.get_connection(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Connection, id))
    }

    fn get_connection(&self, id: ConnectionId) -> StoreResult<Option<Connection>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONNECTION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_connection_row(row)?));
        }
        Ok(None)
    }

    fn delete_connection(&self, id: ConnectionId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM connections WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::not_found(EntityKind::Connection, id));
        }
        Ok(())
    }

    fn list_edges(
        &self,
        asset_id: AssetId,
        direction: Direction,
        connection_type: Option<&ConnectionType>,
    ) -> StoreResult<Vec<Connection>> {
        let mut sql = format!("{CONNECTION_SELECT_SQL} WHERE");
        let mut bind_values: Vec<Value> = Vec::new();
        let asset_text = asset_id.to_string();

        match direction {
            Direction::Outgoing => {
                sql.push_str(" from_asset_id = ?");
                bind_values.push(Value::Text(asset_text));
            }
            Direction::Incoming => {
                sql.push_str(" to_asset_id = ?");
                bind_values.push(Value::Text(asset_text));
            }
            Direction::Both => {
                sql.push_str(" (from_asset_id = ? OR to_asset_id = ?)");
                bind_values.push(Value::Text(asset_text.clone()));
                bind_values.push(Value::Text(asset_text));
            }
        }

        if let Some(connection_type) = connection_type {
            sql.push_str(" AND connection_type = ?");
            bind_values.push(Value::Text(connection_type.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at ASC, rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut edges = Vec::new();
        while let Some(row) = rows.next()? {
            edges.push(parse_connection_row(row)?);
        }
        Ok(edges)
    }
}

fn parse_connection_row(row: &Row<'_>) -> StoreResult<Connection> {
    let id_text: String = row.get("id")?;
    let from_text: String = row.get("from_asset_id")?;
    let to_text: String = row.get("to_asset_id")?;
    let type_text: String = row.get("connection_type")?;
    let connection_type = ConnectionType::parse(&type_text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid connection type `{type_text}` in connections.connection_type"
        ))
    })?;

    Ok(Connection {
        id: parse_uuid(&id_text, "connections.id")?,
        from_asset_id: parse_uuid(&from_text, "connections.from_asset_id")?,
        to_asset_id: parse_uuid(&to_text, "connections.to_asset_id")?,
        connection_type,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}
