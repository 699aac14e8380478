//! Items repository

use crate::{
    error::{AppError, AppResult},
    models::item::{Item, ItemCounters},
    store::{DocStore, Patch, StoreError},
};

use super::{encode_fields, ITEMS};

#[derive(Clone)]
pub struct ItemsRepository {
    store: DocStore,
}

impl ItemsRepository {
    pub fn new(store: DocStore) -> Self {
        Self { store }
    }

    /// All items, in insertion order
    pub async fn list(&self) -> AppResult<Vec<Item>> {
        let docs = self.store.query(ITEMS, &[]).await;
        docs.iter()
            .map(|doc| Item::from_document(doc).map_err(AppError::from))
            .collect()
    }

    /// Get item by ID
    pub async fn get(&self, id: &str) -> AppResult<Item> {
        let doc = self
            .store
            .get(ITEMS, id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))?;
        Ok(Item::from_document(&doc)?)
    }

    /// Create an item; new items start with all counters at zero
    pub async fn create(&self, label: &str) -> AppResult<Item> {
        let mut item = Item {
            id: String::new(),
            label: label.to_string(),
            total_count: Some(0),
            borrowed_count: Some(0),
            available_count: Some(0),
        };
        let id = self.store.add(ITEMS, encode_fields(&item)?).await;
        item.id = id;
        Ok(item)
    }

    /// Rename an item; counters are untouched
    pub async fn update_label(&self, id: &str, label: &str) -> AppResult<Item> {
        self.store
            .update(ITEMS, id, Patch::new().set("label", label))
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_, _) => {
                    AppError::NotFound(format!("Item {} not found", id))
                }
                e => e.into(),
            })?;
        self.get(id).await
    }

    /// Write all three counters as absolute values
    pub async fn set_counters(&self, id: &str, counters: &ItemCounters) -> AppResult<()> {
        self.store
            .update(ITEMS, id, counters.to_patch())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_, _) => {
                    AppError::NotFound(format!("Item {} not found", id))
                }
                e => e.into(),
            })
    }

    /// Delete an item. Instances referencing it are NOT cascade-deleted.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.store.delete(ITEMS, id).await.map_err(|e| match e {
            StoreError::NotFound(_, _) => AppError::NotFound(format!("Item {} not found", id)),
            e => e.into(),
        })
    }
}
