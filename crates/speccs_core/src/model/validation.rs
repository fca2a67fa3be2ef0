//! Field-level validation errors shared by all inventory entities.

use crate::model::attributes::AttributeKind;
use crate::model::taxonomy::TaxonomyCategory;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Inclusive upper bound for `location_angle`.
pub const MAX_ANGLE_DEGREES: f64 = 360.0;
/// Inclusive upper bound for percent-of-wall fields.
pub const MAX_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required display name is blank after trim.
    BlankName { entity: &'static str },
    /// Angle outside `0..=360` degrees.
    AngleOutOfRange(f64),
    /// Percent field outside `0..=100`.
    PercentOutOfRange { field: &'static str, value: f64 },
    /// Numeric field is NaN or infinite.
    NonFiniteNumber { field: &'static str },
    /// Tag does not match the taxonomy grammar.
    InvalidTag {
        category: TaxonomyCategory,
        value: String,
    },
    /// Tag is well-formed but not present in the registry.
    UnregisteredTag {
        category: TaxonomyCategory,
        tag: String,
    },
    /// Status is blank.
    InvalidStatus(String),
    /// Built-in journal action appended by a caller; those are written by
    /// the store alongside the mutation they record.
    ReservedJournalAction(String),
    /// Install date is not `YYYY-MM-DD`.
    InvalidInstallDate(String),
    /// Wall dimension is zero or negative.
    InvalidWallDimension { field: &'static str, value: f64 },
    /// Wall dimension given without a unit.
    MissingWallUnit,
    /// Declared attribute key carries a value of the wrong kind.
    AttributeKindMismatch {
        key: String,
        expected: AttributeKind,
        actual: AttributeKind,
    },
    /// Attribute key is blank.
    BlankAttributeKey,
    /// Connection would link an asset to itself.
    SelfLoop(Uuid),
    /// Actor identifier is blank.
    BlankActor,
    /// Trace depth is zero or above the supported limit.
    InvalidTraceDepth { requested: u32, max: u32 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { entity } => write!(f, "{entity} name must not be blank"),
            Self::AngleOutOfRange(value) => {
                write!(f, "location_angle must be within 0..=360, got {value}")
            }
            Self::PercentOutOfRange { field, value } => {
                write!(f, "{field} must be within 0..=100, got {value}")
            }
            Self::NonFiniteNumber { field } => write!(f, "{field} must be a finite number"),
            Self::InvalidTag { category, value } => {
                write!(f, "invalid {category} tag `{value}`")
            }
            Self::UnregisteredTag { category, tag } => {
                write!(f, "{category} `{tag}` is not registered")
            }
            Self::InvalidStatus(value) => write!(f, "invalid asset status `{value}`"),
            Self::ReservedJournalAction(action) => {
                write!(f, "journal action `{action}` is recorded by the store only")
            }
            Self::InvalidInstallDate(value) => {
                write!(f, "install_date must be YYYY-MM-DD, got `{value}`")
            }
            Self::InvalidWallDimension { field, value } => {
                write!(f, "{field} must be greater than zero, got {value}")
            }
            Self::MissingWallUnit => write!(f, "wall_unit is required when wall dimensions are set"),
            Self::AttributeKindMismatch {
                key,
                expected,
                actual,
            } => write!(f, "attribute `{key}` must be {expected}, got {actual}"),
            Self::BlankAttributeKey => write!(f, "attribute keys must not be blank"),
            Self::SelfLoop(id) => write!(f, "asset {id} cannot be connected to itself"),
            Self::BlankActor => write!(f, "actor must not be blank"),
            Self::InvalidTraceDepth { requested, max } => {
                write!(f, "trace depth must be within 1..={max}, got {requested}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims a display name and rejects blank values.
pub fn normalize_name(entity: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName { entity });
    }
    Ok(trimmed.to_string())
}

/// Trims optional free text, mapping blank input to `None`.
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}
