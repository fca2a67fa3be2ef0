//! String-backed taxonomies for asset types, connection types, journal
//! actions and asset status.
//!
//! # Responsibility
//! - Provide typed views over the tag columns stored as plain TEXT.
//! - Keep every taxonomy open: unknown tags parse into a `Custom` variant
//!   instead of failing.
//!
//! # Invariants
//! - Registry tags (connection types, journal actions, registered roots)
//!   match `[A-Z][A-Za-z0-9]*`.
//! - Asset types are free-form: one or more non-blank segments joined by
//!   `.` (e.g. `Outlet.Duplex`, `Pipe.PEX_A`).
//! - Asset status is any non-blank string.
//! - Values read back from storage never fail to parse.
//! - `as_str()` of a parsed value round-trips through `parse()`.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static TAG_SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("valid tag segment regex"));

/// Registry category for one open taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyCategory {
    AssetType,
    ConnectionType,
    JournalAction,
}

impl TaxonomyCategory {
    /// Stable string id stored in `taxonomy_terms.category`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AssetType => "asset_type",
            Self::ConnectionType => "connection_type",
            Self::JournalAction => "journal_action",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "asset_type" => Some(Self::AssetType),
            "connection_type" => Some(Self::ConnectionType),
            "journal_action" => Some(Self::JournalAction),
            _ => None,
        }
    }

    /// Checks the tag grammar of this category.
    ///
    /// Asset types may be dotted; the registry stores only their root, so
    /// registration of asset types also takes single segments.
    pub fn validate_tag(self, tag: &str) -> Result<(), ValidationError> {
        if TAG_SEGMENT_RE.is_match(tag) {
            return Ok(());
        }
        Err(ValidationError::InvalidTag {
            category: self,
            value: tag.to_string(),
        })
    }
}

impl Display for TaxonomyCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dotted asset taxonomy tag such as `Outlet.Duplex` or `Door`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetType(String);

impl AssetType {
    /// Accepts any tag whose dotted segments are all non-blank.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(ValidationError::InvalidTag {
                category: TaxonomyCategory::AssetType,
                value: value.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps a value read from `assets.asset_type` as-is.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First segment of the tag, e.g. `Outlet` for `Outlet.Duplex`.
    pub fn root(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    /// Returns whether this asset can anchor a room's circular layout.
    pub fn is_door(&self) -> bool {
        self.root().trim().eq_ignore_ascii_case("Door")
    }

    pub fn is_wall_segment(&self) -> bool {
        self.root().trim().eq_ignore_ascii_case("WallSegment")
    }

    /// Returns whether this tag equals `prefix` or is nested under it.
    pub fn is_within(&self, prefix: &str) -> bool {
        self.0 == prefix
            || (self.0.len() > prefix.len()
                && self.0.starts_with(prefix)
                && self.0.as_bytes()[prefix.len()] == b'.')
    }
}

impl TryFrom<String> for AssetType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetType> for String {
    fn from(value: AssetType) -> Self {
        value.0
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in connection type strings.
pub const BUILTIN_CONNECTION_TYPES: &[&str] = &[
    "ElectricalPower",
    "WaterSupply",
    "Drainage",
    "ControlSignal",
    "DataNetwork",
    "RoomAccess",
    "AttachedTo",
];

/// Directed edge category between two assets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConnectionType {
    ElectricalPower,
    WaterSupply,
    Drainage,
    ControlSignal,
    DataNetwork,
    RoomAccess,
    AttachedTo,
    /// Registered at runtime through the taxonomy registry.
    Custom(String),
}

impl ConnectionType {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let parsed = match trimmed {
            "ElectricalPower" => Self::ElectricalPower,
            "WaterSupply" => Self::WaterSupply,
            "Drainage" => Self::Drainage,
            "ControlSignal" => Self::ControlSignal,
            "DataNetwork" => Self::DataNetwork,
            "RoomAccess" => Self::RoomAccess,
            "AttachedTo" => Self::AttachedTo,
            other => {
                TaxonomyCategory::ConnectionType.validate_tag(other)?;
                Self::Custom(other.to_string())
            }
        };
        Ok(parsed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ElectricalPower => "ElectricalPower",
            Self::WaterSupply => "WaterSupply",
            Self::Drainage => "Drainage",
            Self::ControlSignal => "ControlSignal",
            Self::DataNetwork => "DataNetwork",
            Self::RoomAccess => "RoomAccess",
            Self::AttachedTo => "AttachedTo",
            Self::Custom(tag) => tag,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl TryFrom<String> for ConnectionType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ConnectionType> for String {
    fn from(value: ConnectionType) -> Self {
        value.as_str().to_string()
    }
}

impl Display for ConnectionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in journal action strings.
pub const BUILTIN_JOURNAL_ACTIONS: &[&str] =
    &["Create", "Update", "Replace", "Delete", "Link", "Unlink"];

/// Kind of mutation recorded by one journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JournalAction {
    Create,
    Update,
    Replace,
    Delete,
    Link,
    Unlink,
    /// Caller-defined action such as `Inspect` or `Service`.
    Custom(String),
}

impl JournalAction {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let parsed = match trimmed {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Replace" => Self::Replace,
            "Delete" => Self::Delete,
            "Link" => Self::Link,
            "Unlink" => Self::Unlink,
            other => {
                TaxonomyCategory::JournalAction.validate_tag(other)?;
                Self::Custom(other.to_string())
            }
        };
        Ok(parsed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Replace => "Replace",
            Self::Delete => "Delete",
            Self::Link => "Link",
            Self::Unlink => "Unlink",
            Self::Custom(tag) => tag,
        }
    }
}

impl TryFrom<String> for JournalAction {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JournalAction> for String {
    fn from(value: JournalAction) -> Self {
        value.as_str().to_string()
    }
}

impl Display for JournalAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset lifecycle status.
///
/// `Active -> Replaced -> Deleted` is the documented convention; the store
/// does not enforce transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssetStatus {
    #[default]
    Active,
    Replaced,
    /// Soft-deleted; the row stays for history and connections.
    Deleted,
    Custom(String),
}

impl AssetStatus {
    /// Accepts any non-blank status; only blank input is rejected.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidStatus(value.to_string()));
        }
        Ok(Self::from_stored(value))
    }

    /// Maps a value read from `assets.status` without failing.
    pub(crate) fn from_stored(value: &str) -> Self {
        match value.trim() {
            "Active" => Self::Active,
            "Replaced" => Self::Replaced,
            "Deleted" => Self::Deleted,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Replaced => "Replaced",
            Self::Deleted => "Deleted",
            Self::Custom(tag) => tag,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl TryFrom<String> for AssetStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetStatus> for String {
    fn from(value: AssetStatus) -> Self {
        value.as_str().to_string()
    }
}

impl Display for AssetStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
