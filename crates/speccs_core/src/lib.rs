//! Core domain logic for the Speccs home inventory store.
//! This crate is the single source of truth for inventory invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_database_url, open_db, open_db_in_memory, DatabaseTarget, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::{
    Asset, AssetId, AssetStatus, AssetType, AttributeValue, Attributes, Building, BuildingFields,
    ConnectedAsset, Connection, ConnectionType, Direction, Floor, FloorFields, JournalAction,
    JournalEntry, NewConnection, Property, PropertyFields, Room, RoomFields, TaxonomyCategory,
    TraceStep, TraversalQuery, ValidationError,
};
pub use repo::asset_repo::{AssetListQuery, RoomScope};
pub use repo::error::{ConstraintViolation, EntityKind, StoreError, StoreResult};
pub use repo::taxonomy_repo::TaxonomyTerm;
pub use service::{InventoryStore, MAX_TRACE_DEPTH};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
