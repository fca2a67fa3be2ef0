//! Ownership chain: Property -> Building -> Floor -> Room.
//!
//! # Invariants
//! - Every non-root entity has exactly one owning parent.
//! - Deleting a parent removes every descendant (engine cascade).
//! - `Room::reference_door_asset_id` is a non-owning lookup; it is cleared,
//!   not cascaded, when the referenced asset row disappears.

use crate::model::asset::AssetId;
use crate::model::validation::{normalize_name, normalize_optional_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PropertyId = Uuid;
pub type BuildingId = Uuid;
pub type FloorId = Uuid;
pub type RoomId = Uuid;

/// Top-level container, e.g. one street address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    /// Free-text postal address.
    pub address: Option<String>,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms.
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub property_id: PropertyId,
    pub name: String,
    /// Free-form tag such as `House` or `Garage`.
    pub building_type: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub building_id: BuildingId,
    pub name: String,
    /// Display sort key; negative for below-grade floors.
    pub level_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub floor_id: FloorId,
    pub name: String,
    pub description: Option<String>,
    /// Door asset anchoring angle zero of the circular wall layout.
    pub reference_door_asset_id: Option<AssetId>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Editable property fields, used for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFields {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl PropertyFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_name("property", &self.name)?,
            address: normalize_optional_text(self.address.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingFields {
    pub name: String,
    #[serde(default)]
    pub building_type: Option<String>,
}

impl BuildingFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            building_type: None,
        }
    }

    pub fn with_type(mut self, building_type: impl Into<String>) -> Self {
        self.building_type = Some(building_type.into());
        self
    }

    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_name("building", &self.name)?,
            building_type: normalize_optional_text(self.building_type.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorFields {
    pub name: String,
    #[serde(default)]
    pub level_order: i64,
}

impl FloorFields {
    pub fn new(name: impl Into<String>, level_order: i64) -> Self {
        Self {
            name: name.into(),
            level_order,
        }
    }

    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_name("floor", &self.name)?,
            level_order: self.level_order,
        })
    }
}

/// Editable room fields. The reference door is set through its own
/// operation because it carries cross-entity rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFields {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl RoomFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_name("room", &self.name)?,
            description: normalize_optional_text(self.description.as_deref()),
        })
    }
}
