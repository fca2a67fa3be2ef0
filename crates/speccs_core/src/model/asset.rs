//! Asset domain model.
//!
//! # Responsibility
//! - Define the central tracked item (outlets, pipes, doors, warranties...).
//! - Validate the circular room-layout descriptor and wall dimensions.
//!
//! # Invariants
//! - `id` is stable and never reused.
//! - `status` carries soft-delete state; rows are only physically removed
//!   by an explicit purge.
//! - `location_angle` is within 0..=360 and `location_height` /
//!   `location_depth` within 0..=100 when set.

use crate::model::attributes::{attribute_schema, validate_bag, Attributes};
use crate::model::hierarchy::RoomId;
use crate::model::taxonomy::{AssetStatus, AssetType};
use crate::model::validation::{ValidationError, MAX_ANGLE_DEGREES, MAX_PERCENT};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static INSTALL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid install date regex")
});

pub type AssetId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    /// `None` for assets that are not room-scoped.
    pub room_id: Option<RoomId>,
    pub asset_type: AssetType,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Calendar date, `YYYY-MM-DD`.
    pub install_date: Option<String>,
    pub status: AssetStatus,
    /// Degrees clockwise from the room's reference door.
    pub location_angle: Option<f64>,
    /// Percent of wall height from the floor.
    pub location_height: Option<f64>,
    /// Percent of the distance from the wall toward the room center.
    pub location_depth: Option<f64>,
    /// Meaningful for `WallSegment` assets.
    pub wall_length: Option<f64>,
    pub wall_height: Option<f64>,
    pub wall_unit: Option<String>,
    pub attributes: Attributes,
    /// Epoch ms; assigned by storage.
    pub created_at: i64,
    /// Epoch ms; assigned by storage.
    pub updated_at: i64,
}

impl Asset {
    /// Creates a new active asset with a generated stable ID.
    pub fn new(asset_type: AssetType) -> Self {
        Self::with_id(Uuid::new_v4(), asset_type)
    }

    /// Creates a new active asset with a caller-provided stable ID.
    pub fn with_id(id: AssetId, asset_type: AssetType) -> Self {
        Self {
            id,
            room_id: None,
            asset_type,
            name: None,
            description: None,
            install_date: None,
            status: AssetStatus::Active,
            location_angle: None,
            location_height: None,
            location_depth: None,
            wall_length: None,
            wall_height: None,
            wall_unit: None,
            attributes: Attributes::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn in_room(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validates field ranges, formats and the attribute sub-schema.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.status.as_str().trim().is_empty() {
            return Err(ValidationError::InvalidStatus(self.status.as_str().to_string()));
        }
        if let Some(angle) = self.location_angle {
            if !angle.is_finite() {
                return Err(ValidationError::NonFiniteNumber {
                    field: "location_angle",
                });
            }
            if !(0.0..=MAX_ANGLE_DEGREES).contains(&angle) {
                return Err(ValidationError::AngleOutOfRange(angle));
            }
        }
        validate_percent("location_height", self.location_height)?;
        validate_percent("location_depth", self.location_depth)?;

        if let Some(date) = self.install_date.as_deref() {
            if !INSTALL_DATE_RE.is_match(date) {
                return Err(ValidationError::InvalidInstallDate(date.to_string()));
            }
        }

        validate_dimension("wall_length", self.wall_length)?;
        validate_dimension("wall_height", self.wall_height)?;
        let has_dimension = self.wall_length.is_some() || self.wall_height.is_some();
        let has_unit = self
            .wall_unit
            .as_deref()
            .is_some_and(|unit| !unit.trim().is_empty());
        if has_dimension && !has_unit {
            return Err(ValidationError::MissingWallUnit);
        }

        validate_bag(&self.attributes, attribute_schema(&self.asset_type))
    }

    /// Returns whether this asset should be considered visible/active.
    pub fn is_active(&self) -> bool {
        self.status == AssetStatus::Active
    }

    /// Lists names of the editable fields that differ from `other`.
    pub fn changed_fields(&self, other: &Asset) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.room_id != other.room_id {
            changed.push("room_id");
        }
        if self.asset_type != other.asset_type {
            changed.push("asset_type");
        }
        if self.name != other.name {
            changed.push("name");
        }
        if self.description != other.description {
            changed.push("description");
        }
        if self.install_date != other.install_date {
            changed.push("install_date");
        }
        if self.status != other.status {
            changed.push("status");
        }
        if self.location_angle != other.location_angle {
            changed.push("location_angle");
        }
        if self.location_height != other.location_height {
            changed.push("location_height");
        }
        if self.location_depth != other.location_depth {
            changed.push("location_depth");
        }
        if self.wall_length != other.wall_length {
            changed.push("wall_length");
        }
        if self.wall_height != other.wall_height {
            changed.push("wall_height");
        }
        if self.wall_unit != other.wall_unit {
            changed.push("wall_unit");
        }
        if self.attributes != other.attributes {
            changed.push("attributes");
        }
        changed
    }
}

fn validate_percent(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    let Some(value) = value else {
        return Ok(());
    };
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteNumber { field });
    }
    if !(0.0..=MAX_PERCENT).contains(&value) {
        return Err(ValidationError::PercentOutOfRange { field, value });
    }
    Ok(())
}

fn validate_dimension(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    let Some(value) = value else {
        return Ok(());
    };
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteNumber { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::InvalidWallDimension { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Asset;
    use crate::model::taxonomy::{AssetStatus, AssetType};
    use crate::model::validation::ValidationError;

    fn door() -> Asset {
        Asset::new(AssetType::parse("Door").unwrap())
    }

    #[test]
    fn new_asset_defaults_to_active_without_location() {
        let asset = door();
        assert_eq!(asset.status, AssetStatus::Active);
        assert!(asset.location_angle.is_none());
        assert!(asset.location_height.is_none());
        assert!(asset.location_depth.is_none());
        assert!(asset.validate().is_ok());
    }

    #[test]
    fn location_bounds_are_inclusive() {
        let mut asset = door();
        asset.location_angle = Some(360.0);
        asset.location_height = Some(0.0);
        asset.location_depth = Some(100.0);
        assert!(asset.validate().is_ok());

        asset.location_angle = Some(360.5);
        assert_eq!(
            asset.validate().unwrap_err(),
            ValidationError::AngleOutOfRange(360.5)
        );

        asset.location_angle = Some(90.0);
        asset.location_height = Some(-1.0);
        assert!(matches!(
            asset.validate().unwrap_err(),
            ValidationError::PercentOutOfRange {
                field: "location_height",
                ..
            }
        ));

        asset.location_height = Some(f64::NAN);
        assert!(matches!(
            asset.validate().unwrap_err(),
            ValidationError::NonFiniteNumber { .. }
        ));
    }

    #[test]
    fn wall_dimensions_require_positive_values_and_unit() {
        let mut wall = Asset::new(AssetType::parse("WallSegment").unwrap());
        wall.wall_length = Some(12.5);
        assert_eq!(wall.validate().unwrap_err(), ValidationError::MissingWallUnit);

        wall.wall_unit = Some("ft".to_string());
        assert!(wall.validate().is_ok());

        wall.wall_height = Some(0.0);
        assert!(matches!(
            wall.validate().unwrap_err(),
            ValidationError::InvalidWallDimension {
                field: "wall_height",
                ..
            }
        ));
    }

    #[test]
    fn install_date_must_be_calendar_date() {
        let mut asset = door();
        asset.install_date = Some("2021-06-30".to_string());
        assert!(asset.validate().is_ok());
        asset.install_date = Some("2021-13-01".to_string());
        assert!(matches!(
            asset.validate().unwrap_err(),
            ValidationError::InvalidInstallDate(_)
        ));
    }

    #[test]
    fn any_non_blank_status_validates() {
        let mut asset = door();
        asset.status = AssetStatus::Custom("In Repair".to_string());
        assert!(asset.validate().is_ok());
        asset.status = AssetStatus::Custom("  ".to_string());
        assert!(matches!(
            asset.validate().unwrap_err(),
            ValidationError::InvalidStatus(_)
        ));
    }

    #[test]
    fn changed_fields_lists_differences() {
        let before = door();
        let mut after = before.clone();
        after.name = Some("Front door".to_string());
        after.location_angle = Some(0.0);
        assert_eq!(after.changed_fields(&before), vec!["name", "location_angle"]);
    }
}
