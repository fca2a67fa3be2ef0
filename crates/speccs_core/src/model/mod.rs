//! Inventory domain model.
//!
//! # Responsibility
//! - Define the property/building/floor/room hierarchy, assets, the asset
//!   connection graph and journal records.
//! - Keep taxonomies open and schema-less payloads typed.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - Asset deletion is a status change; physical removal is a purge.

pub mod asset;
pub mod attributes;
pub mod connection;
pub mod hierarchy;
pub mod journal;
pub mod taxonomy;
pub mod validation;

pub use asset::{Asset, AssetId};
pub use attributes::{AttributeKind, AttributeValue, Attributes};
pub use connection::{
    ConnectedAsset, Connection, ConnectionId, Direction, NewConnection, TraceStep, TraversalQuery,
};
pub use hierarchy::{
    Building, BuildingFields, BuildingId, Floor, FloorFields, FloorId, Property, PropertyFields,
    PropertyId, Room, RoomFields, RoomId,
};
pub use journal::{JournalEntry, JournalEntryId, NewJournalEntry, DEFAULT_ACTOR};
pub use taxonomy::{AssetStatus, AssetType, ConnectionType, JournalAction, TaxonomyCategory};
pub use validation::ValidationError;
