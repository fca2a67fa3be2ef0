//! Append-only audit record of asset mutations.

use crate::model::asset::AssetId;
use crate::model::attributes::{AttributeValue, Attributes};
use crate::model::taxonomy::JournalAction;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type JournalEntryId = Uuid;

/// Actor recorded when the caller does not name one.
pub const DEFAULT_ACTOR: &str = "System";

/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub asset_id: AssetId,
    pub action: JournalAction,
    pub actor: String,
    /// Epoch ms.
    pub recorded_at: i64,
    pub details: Attributes,
}

/// Entry input before storage assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJournalEntry {
    pub asset_id: AssetId,
    pub action: JournalAction,
    pub actor: String,
    pub details: Attributes,
}

impl NewJournalEntry {
    pub fn new(asset_id: AssetId, action: JournalAction, actor: impl Into<String>) -> Self {
        Self {
            asset_id,
            action,
            actor: actor.into(),
            details: Attributes::new(),
        }
    }

    pub fn detail(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}
