//! Typed key/value bags for asset attributes and journal details.
//!
//! # Responsibility
//! - Model schema-less payloads as `String -> AttributeValue` maps.
//! - Publish the documented sub-schema per asset-type root and per journal
//!   action, and check declared keys against it.
//!
//! # Invariants
//! - Keys not declared by a sub-schema are allowed; the bag stays open.
//! - A declared key must carry its declared kind. `number` also accepts
//!   integer values.
//! - Bags serialize as flat JSON objects with scalar values.

use crate::model::taxonomy::{AssetType, JournalAction};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Scalar value stored in an attribute or details bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Boolean(_) => AttributeKind::Boolean,
            Self::Integer(_) => AttributeKind::Integer,
            Self::Number(_) => AttributeKind::Number,
            Self::Text(_) => AttributeKind::Text,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Declared kind of one sub-schema key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Text,
    Integer,
    Number,
    Boolean,
}

impl AttributeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, actual: AttributeKind) -> bool {
        self == actual || (self == Self::Number && actual == Self::Integer)
    }
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered attribute bag.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Declared keys for one asset-type root or journal action.
pub type SubSchema = &'static [(&'static str, AttributeKind)];

const OUTLET_SCHEMA: SubSchema = &[
    ("amperage", AttributeKind::Integer),
    ("voltage", AttributeKind::Integer),
    ("gfci", AttributeKind::Boolean),
];
const SWITCH_SCHEMA: SubSchema = &[
    ("gang_count", AttributeKind::Integer),
    ("dimmer", AttributeKind::Boolean),
];
const PIPE_SCHEMA: SubSchema = &[
    ("material", AttributeKind::Text),
    ("diameter_in", AttributeKind::Number),
];
const PAINT_SCHEMA: SubSchema = &[
    ("brand", AttributeKind::Text),
    ("color_code", AttributeKind::Text),
    ("finish", AttributeKind::Text),
];
const WARRANTY_SCHEMA: SubSchema = &[
    ("provider", AttributeKind::Text),
    ("policy_number", AttributeKind::Text),
    ("expires_on", AttributeKind::Text),
];
const BREAKER_SCHEMA: SubSchema = &[
    ("amperage", AttributeKind::Integer),
    ("pole_count", AttributeKind::Integer),
];
const DOOR_SCHEMA: SubSchema = &[
    ("swing", AttributeKind::Text),
    ("width_in", AttributeKind::Number),
];
const WINDOW_SCHEMA: SubSchema = &[
    ("width_in", AttributeKind::Number),
    ("height_in", AttributeKind::Number),
];

const CREATE_DETAILS: SubSchema = &[("asset_type", AttributeKind::Text)];
const UPDATE_DETAILS: SubSchema = &[("changed_fields", AttributeKind::Text)];
const REPLACE_DETAILS: SubSchema = &[
    ("replaced_by", AttributeKind::Text),
    ("replaces", AttributeKind::Text),
];
const DELETE_DETAILS: SubSchema = &[("previous_status", AttributeKind::Text)];
const LINK_DETAILS: SubSchema = &[
    ("connection_id", AttributeKind::Text),
    ("connection_type", AttributeKind::Text),
    ("peer_asset_id", AttributeKind::Text),
    ("direction", AttributeKind::Text),
];

/// Returns the documented attribute keys for an asset type.
///
/// Lookup uses the root segment, so `Outlet.Duplex` shares `Outlet` keys.
pub fn attribute_schema(asset_type: &AssetType) -> SubSchema {
    match asset_type.root() {
        "Outlet" => OUTLET_SCHEMA,
        "Switch" => SWITCH_SCHEMA,
        "Pipe" => PIPE_SCHEMA,
        "Paint" => PAINT_SCHEMA,
        "Warranty" => WARRANTY_SCHEMA,
        "Breaker" => BREAKER_SCHEMA,
        "Door" => DOOR_SCHEMA,
        "Window" => WINDOW_SCHEMA,
        _ => &[],
    }
}

/// Returns the documented details keys for a journal action.
pub fn details_schema(action: &JournalAction) -> SubSchema {
    match action {
        JournalAction::Create => CREATE_DETAILS,
        JournalAction::Update => UPDATE_DETAILS,
        JournalAction::Replace => REPLACE_DETAILS,
        JournalAction::Delete => DELETE_DETAILS,
        JournalAction::Link | JournalAction::Unlink => LINK_DETAILS,
        JournalAction::Custom(_) => &[],
    }
}

/// Checks a bag against one sub-schema.
pub fn validate_bag(bag: &Attributes, schema: SubSchema) -> Result<(), ValidationError> {
    for (key, value) in bag {
        if key.trim().is_empty() {
            return Err(ValidationError::BlankAttributeKey);
        }
        if let AttributeValue::Number(number) = value {
            if !number.is_finite() {
                return Err(ValidationError::NonFiniteNumber { field: "attributes" });
            }
        }
        let declared = schema
            .iter()
            .find(|(declared_key, _)| *declared_key == key.as_str());
        if let Some((_, expected)) = declared {
            let actual = value.kind();
            if !expected.accepts(actual) {
                return Err(ValidationError::AttributeKindMismatch {
                    key: key.clone(),
                    expected: *expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}

/// Serializes a bag into the JSON text stored in the database.
pub fn bag_to_json(bag: &Attributes) -> String {
    serde_json::to_string(bag).unwrap_or_else(|_| "{}".to_string())
}

/// Parses a bag stored as JSON text.
pub fn bag_from_json(value: &str) -> Result<Attributes, serde_json::Error> {
    serde_json::from_str(value)
}
