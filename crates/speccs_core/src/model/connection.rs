//! Directed, typed edges between assets.
//!
//! Connections form a general directed graph independent of the ownership
//! tree, so a circuit or pipe run can be traced across rooms and buildings.

use crate::model::asset::{Asset, AssetId};
use crate::model::taxonomy::ConnectionType;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ConnectionId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    /// Upstream endpoint (e.g. the breaker feeding an outlet).
    pub from_asset_id: AssetId,
    pub to_asset_id: AssetId,
    pub connection_type: ConnectionType,
    pub notes: Option<String>,
    pub created_at: i64,
}

impl Connection {
    /// Returns the endpoint opposite to `asset_id`.
    pub fn peer_of(&self, asset_id: AssetId) -> AssetId {
        if self.from_asset_id == asset_id {
            self.to_asset_id
        } else {
            self.from_asset_id
        }
    }
}

/// Input for a new connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConnection {
    pub from_asset_id: AssetId,
    pub to_asset_id: AssetId,
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewConnection {
    pub fn new(from: AssetId, to: AssetId, connection_type: ConnectionType) -> Self {
        Self {
            from_asset_id: from,
            to_asset_id: to,
            connection_type,
            notes: None,
        }
    }
}

/// Edge direction relative to the asset a query starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Edges whose `from_asset_id` is the origin.
    Outgoing,
    /// Edges whose `to_asset_id` is the origin.
    Incoming,
    #[default]
    Both,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
            Self::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "outgoing" => Some(Self::Outgoing),
            "incoming" => Some(Self::Incoming),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter for neighbour and trace queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalQuery {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub connection_type: Option<ConnectionType>,
}

impl TraversalQuery {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            connection_type: None,
        }
    }

    pub fn of_type(mut self, connection_type: ConnectionType) -> Self {
        self.connection_type = Some(connection_type);
        self
    }
}

/// One neighbour of an asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedAsset {
    pub connection: Connection,
    pub asset: Asset,
    /// `Outgoing` when the neighbour is the edge target, `Incoming` when it
    /// is the edge source.
    pub direction: Direction,
}

/// One asset reached by a breadth-first trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub asset: Asset,
    /// Hop count from the origin, starting at 1.
    pub depth: u32,
    /// Edge the asset was first reached through.
    pub via: Connection,
    /// Asset the edge was followed from.
    pub parent_asset_id: AssetId,
}
