//! Error taxonomy for repository and store operations.
//!
//! # Invariants
//! - Raw rusqlite errors never leave the store unwrapped: engine constraint
//!   failures become `Constraint(ConstraintViolation::Storage)`, everything
//!   else is wrapped in `DbError`.
//! - `NotFound` always names the entity kind that was looked up.

use crate::db::DbError;
use crate::model::asset::AssetId;
use crate::model::hierarchy::RoomId;
use crate::model::taxonomy::TaxonomyCategory;
use crate::model::validation::ValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity kinds named by `NotFound` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Property,
    Building,
    Floor,
    Room,
    Asset,
    Connection,
    JournalEntry,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Building => "building",
            Self::Floor => "floor",
            Self::Room => "room",
            Self::Asset => "asset",
            Self::Connection => "connection",
            Self::JournalEntry => "journal entry",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-entity rules the schema alone cannot express, plus constraint
/// failures raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// Reference door target is not a `Door` asset.
    ReferenceDoorNotDoor {
        room_id: RoomId,
        asset_id: AssetId,
        asset_type: String,
    },
    /// Reference door target does not belong to the room.
    ReferenceDoorOutsideRoom { room_id: RoomId, asset_id: AssetId },
    /// Reference door target is soft-deleted.
    ReferenceDoorInactive { room_id: RoomId, asset_id: AssetId },
    /// Taxonomy tag is already registered.
    DuplicateTerm {
        category: TaxonomyCategory,
        tag: String,
    },
    /// Foreign-key, uniqueness or trigger failure reported by SQLite.
    Storage(String),
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReferenceDoorNotDoor {
                room_id,
                asset_id,
                asset_type,
            } => write!(
                f,
                "reference door for room {room_id} must be a Door asset; {asset_id} is `{asset_type}`"
            ),
            Self::ReferenceDoorOutsideRoom { room_id, asset_id } => write!(
                f,
                "reference door {asset_id} does not belong to room {room_id}"
            ),
            Self::ReferenceDoorInactive { room_id, asset_id } => write!(
                f,
                "reference door {asset_id} for room {room_id} is deleted"
            ),
            Self::DuplicateTerm { category, tag } => {
                write!(f, "{category} `{tag}` is already registered")
            }
            Self::Storage(message) => write!(f, "storage constraint failed: {message}"),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound { entity: EntityKind, id: Uuid },
    Constraint(ConstraintViolation),
    Db(DbError),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl StoreError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Constraint(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "inventory store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Constraint(_) => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConstraintViolation> for StoreError {
    fn from(value: ConstraintViolation) -> Self {
        Self::Constraint(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                let message = message
                    .clone()
                    .unwrap_or_else(|| failure.to_string());
                Self::Constraint(ConstraintViolation::Storage(message))
            }
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}
