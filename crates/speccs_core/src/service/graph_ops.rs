//! Connection graph operations on [`InventoryStore`].
//!
//! # Invariants
//! - Connections join two distinct, existing assets with a registered type.
//! - Linking and unlinking journal both endpoints in one transaction.
//! - An edge removed by a purge or hierarchy delete journals `Unlink` on
//!   the endpoint that survives.
//! - `trace` visits every asset at most once, so cycles terminate.

use crate::model::asset::AssetId;
use crate::model::connection::{
    ConnectedAsset, Connection, ConnectionId, Direction, NewConnection, TraceStep, TraversalQuery,
};
use crate::model::journal::NewJournalEntry;
use crate::model::taxonomy::{JournalAction, TaxonomyCategory};
use crate::model::validation::{normalize_optional_text, ValidationError};
use crate::repo::connection_repo::{ConnectionRepository, SqliteConnectionRepository};
use crate::repo::error::{EntityKind, StoreError, StoreResult};
use crate::repo::taxonomy_repo::{SqliteTaxonomyRepository, TaxonomyRepository};
use crate::service::asset_ops::load_asset;
use crate::service::inventory_store::{require_row, InventoryStore};
use log::debug;
use rusqlite::Connection as SqliteConnection;
use std::collections::{HashSet, VecDeque};

/// Upper bound for `trace` depth.
pub const MAX_TRACE_DEPTH: u32 = 64;

impl InventoryStore<'_> {
    /// Creates a directed edge and journals `Link` on both endpoints.
    ///
    /// # Errors
    /// - `Validation` for self-loops or unregistered connection types.
    /// - `NotFound` when either endpoint is missing.
    pub fn create_connection(&self, input: &NewConnection) -> StoreResult<Connection> {
        if input.from_asset_id == input.to_asset_id {
            return Err(ValidationError::SelfLoop(input.from_asset_id).into());
        }
        let mut input = input.clone();
        input.notes = normalize_optional_text(input.notes.as_deref());

        self.write("connection_create", |conn| {
            require_row(conn, EntityKind::Asset, input.from_asset_id)?;
            require_row(conn, EntityKind::Asset, input.to_asset_id)?;

            let type_tag = input.connection_type.as_str();
            if !SqliteTaxonomyRepository::new(conn)
                .is_registered(TaxonomyCategory::ConnectionType, type_tag)?
            {
                return Err(ValidationError::UnregisteredTag {
                    category: TaxonomyCategory::ConnectionType,
                    tag: type_tag.to_string(),
                }
                .into());
            }

            let created = SqliteConnectionRepository::new(conn).insert_connection(&input)?;
            self.journal_edge(conn, &created, JournalAction::Link)?;
            Ok(created)
        })
    }

    pub fn get_connection(&self, id: ConnectionId) -> StoreResult<Connection> {
        SqliteConnectionRepository::new(self.conn)
            .get_connection(id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Connection, id))
    }

    /// Deletes an edge and journals `Unlink` on both endpoints.
    pub fn delete_connection(&self, id: ConnectionId) -> StoreResult<()> {
        self.write("connection_delete", |conn| {
            let connections = SqliteConnectionRepository::new(conn);
            let existing = connections
                .get_connection(id)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Connection, id))?;
            connections.delete_connection(id)?;
            self.journal_edge(conn, &existing, JournalAction::Unlink)?;
            Ok(())
        })
    }

    /// Lists direct neighbours of `asset_id`.
    pub fn connected_assets(
        &self,
        asset_id: AssetId,
        query: &TraversalQuery,
    ) -> StoreResult<Vec<ConnectedAsset>> {
        require_row(self.conn, EntityKind::Asset, asset_id)?;
        let edges = SqliteConnectionRepository::new(self.conn).list_edges(
            asset_id,
            query.direction,
            query.connection_type.as_ref(),
        )?;

        let mut neighbours = Vec::with_capacity(edges.len());
        for edge in edges {
            let direction = if edge.from_asset_id == asset_id {
                Direction::Outgoing
            } else {
                Direction::Incoming
            };
            let asset = load_asset(self.conn, edge.peer_of(asset_id))?;
            neighbours.push(ConnectedAsset {
                connection: edge,
                asset,
                direction,
            });
        }
        Ok(neighbours)
    }

    /// Breadth-first walk from `asset_id` up to `max_depth` hops.
    ///
    /// Each reachable asset appears once, with the hop count and edge of its
    /// first discovery. The origin itself is not part of the result.
    pub fn trace(
        &self,
        asset_id: AssetId,
        query: &TraversalQuery,
        max_depth: u32,
    ) -> StoreResult<Vec<TraceStep>> {
        if max_depth == 0 || max_depth > MAX_TRACE_DEPTH {
            return Err(ValidationError::InvalidTraceDepth {
                requested: max_depth,
                max: MAX_TRACE_DEPTH,
            }
            .into());
        }
        require_row(self.conn, EntityKind::Asset, asset_id)?;

        let connections = SqliteConnectionRepository::new(self.conn);
        let mut visited = HashSet::from([asset_id]);
        let mut frontier = VecDeque::from([(asset_id, 0_u32)]);
        let mut steps = Vec::new();

        while let Some((current, depth)) = frontier.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let edges = connections.list_edges(
                current,
                query.direction,
                query.connection_type.as_ref(),
            )?;
            for edge in edges {
                let peer = edge.peer_of(current);
                if !visited.insert(peer) {
                    continue;
                }
                let asset = load_asset(self.conn, peer)?;
                steps.push(TraceStep {
                    asset,
                    depth: depth + 1,
                    via: edge,
                    parent_asset_id: current,
                });
                frontier.push_back((peer, depth + 1));
            }
        }

        debug!(
            "event=trace module=store status=ok origin={} direction={} reached={}",
            asset_id,
            query.direction,
            steps.len()
        );
        Ok(steps)
    }

    fn journal_edge(
        &self,
        conn: &SqliteConnection,
        edge: &Connection,
        action: JournalAction,
    ) -> StoreResult<()> {
        for asset_id in [edge.from_asset_id, edge.to_asset_id] {
            self.journal(conn, self.edge_entry(edge, asset_id, action.clone()))?;
        }
        Ok(())
    }

    /// Journals `Unlink` on every surviving endpoint of edges that the
    /// removal of `doomed` assets is about to cascade away.
    ///
    /// Must run before the delete, inside the same write.
    pub(crate) fn journal_cascaded_unlinks(
        &self,
        conn: &SqliteConnection,
        doomed: &[AssetId],
    ) -> StoreResult<()> {
        let doomed_set: HashSet<AssetId> = doomed.iter().copied().collect();
        let connections = SqliteConnectionRepository::new(conn);
        let mut seen = HashSet::new();
        for &asset_id in doomed {
            for edge in connections.list_edges(asset_id, Direction::Both, None)? {
                if !seen.insert(edge.id) {
                    continue;
                }
                for endpoint in [edge.from_asset_id, edge.to_asset_id] {
                    if !doomed_set.contains(&endpoint) {
                        let entry = self.edge_entry(&edge, endpoint, JournalAction::Unlink);
                        self.journal(conn, entry)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Entry for `asset_id`, one endpoint of `edge`.
    fn edge_entry(
        &self,
        edge: &Connection,
        asset_id: AssetId,
        action: JournalAction,
    ) -> NewJournalEntry {
        let (peer_id, direction) = if edge.from_asset_id == asset_id {
            (edge.to_asset_id, Direction::Outgoing)
        } else {
            (edge.from_asset_id, Direction::Incoming)
        };
        NewJournalEntry::new(asset_id, action, &self.actor)
            .detail("connection_id", edge.id.to_string())
            .detail("connection_type", edge.connection_type.as_str())
            .detail("peer_asset_id", peer_id.to_string())
            .detail("direction", direction.as_str())
    }
}
