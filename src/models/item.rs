//! Item (equipment type) model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::store::{Document, Patch, StoreError};

/// The three aggregate counters materialized on an item document.
/// Invariant once present: `total == borrowed + available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemCounters {
    pub total: i64,
    pub borrowed: i64,
    pub available: i64,
}

impl ItemCounters {
    /// Patch writing all three counters as absolute values (repair seeding)
    pub fn to_patch(&self) -> Patch {
        Patch::new()
            .set("totalCount", self.total)
            .set("borrowedCount", self.borrowed)
            .set("availableCount", self.available)
    }
}

/// Full item model from the store
///
/// The counters are optional at the schema level: documents written before
/// counters existed lack them, and absence is a distinct state from zero.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Store document identifier
    #[serde(skip_deserializing)]
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrowed_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_count: Option<i64>,
}

impl Item {
    /// Decode an item from its store document
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut item: Item = doc.decode()?;
        item.id = doc.id.clone();
        Ok(item)
    }

    /// The materialized counters, or None when any of the three is absent
    /// (a partially-written set counts as absent and gets repaired whole)
    pub fn counters(&self) -> Option<ItemCounters> {
        match (self.total_count, self.borrowed_count, self.available_count) {
            (Some(total), Some(borrowed), Some(available)) => Some(ItemCounters {
                total,
                borrowed,
                available,
            }),
            _ => None,
        }
    }
}

/// Create item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, max = 200))]
    pub label: String,
}

/// Update item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, max = 200))]
    pub label: String,
}

/// Per-item availability row for display
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemAvailability {
    pub id: String,
    pub label: String,
    pub total_count: i64,
    pub borrowed_count: i64,
    pub available_count: i64,
}
