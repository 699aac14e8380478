//! Instance (physical unit) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::store::{Document, Predicate, StoreError};

/// One physical unit of an item.
///
/// The business tag (`tag`, persisted as `id`) is human-assigned and unique
/// across all instances; the store document identifier is a separate,
/// store-owned value. Invariant: `is_available == false` iff `borrowed_by`
/// and `borrowed_at` are both set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Store document identifier
    #[serde(skip)]
    pub doc_id: String,
    /// Human-assigned identification tag
    #[serde(rename = "id")]
    pub tag: String,
    pub item_id: String,
    pub is_available: bool,
    pub borrowed_by: Option<String>,
    pub borrowed_at: Option<DateTime<Utc>>,
}

impl Instance {
    /// Decode an instance from its store document
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut instance: Instance = doc.decode()?;
        instance.doc_id = doc.id.clone();
        Ok(instance)
    }
}

/// Create instance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstance {
    /// Identification tag, unique across all instances
    #[validate(length(min = 1, max = 100))]
    pub tag: String,
    pub item_id: String,
}

/// Server-side instance filter; absent fields do not constrain the result
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InstanceFilter {
    /// Restrict to instances of one item
    pub item_id: Option<String>,
    /// Restrict by availability
    pub is_available: Option<bool>,
    /// Restrict to instances borrowed by one class
    pub borrowed_by: Option<String>,
}

impl InstanceFilter {
    pub fn for_item(item_id: &str) -> Self {
        Self {
            item_id: Some(item_id.to_string()),
            ..Self::default()
        }
    }

    pub fn to_predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(ref item_id) = self.item_id {
            predicates.push(Predicate::eq("itemId", item_id.as_str()));
        }
        if let Some(is_available) = self.is_available {
            predicates.push(Predicate::eq("isAvailable", is_available));
        }
        if let Some(ref borrowed_by) = self.borrowed_by {
            predicates.push(Predicate::eq("borrowedBy", borrowed_by.as_str()));
        }
        predicates
    }
}
