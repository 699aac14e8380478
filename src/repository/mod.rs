//! Repository layer: typed access to the store's collections
//!
//! No method here enforces cross-entity invariants; that is the ledger's
//! job. The repositories translate between typed models and the store's
//! document field maps.

pub mod admins;
pub mod classes;
pub mod instances;
pub mod items;

use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::store::{DocStore, Fields};

/// Collection names in the underlying store
pub const ITEMS: &str = "items";
pub const CLASSES: &str = "classes";
pub const INSTANCES: &str = "instances";
pub const ADMINS: &str = "admins";

/// Serialize a model into a store field map
pub(crate) fn encode_fields<T: Serialize>(value: &T) -> AppResult<Fields> {
    match serde_json::to_value(value).map_err(crate::store::StoreError::from)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Internal(
            "model did not serialize to an object".to_string(),
        )),
    }
}

/// Main repository struct holding the document store handle
#[derive(Clone)]
pub struct Repository {
    pub store: DocStore,
    pub items: items::ItemsRepository,
    pub classes: classes::ClassesRepository,
    pub instances: instances::InstancesRepository,
    pub admins: admins::AdminsRepository,
}

impl Repository {
    /// Create a new repository over the given store
    pub fn new(store: DocStore) -> Self {
        Self {
            items: items::ItemsRepository::new(store.clone()),
            classes: classes::ClassesRepository::new(store.clone()),
            instances: instances::InstancesRepository::new(store.clone()),
            admins: admins::AdminsRepository::new(store.clone()),
            store,
        }
    }
}
