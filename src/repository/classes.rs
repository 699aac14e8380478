//! Classes repository

use crate::{
    error::{AppError, AppResult},
    models::class::Class,
    store::{DocStore, Patch, StoreError},
};

use super::{encode_fields, CLASSES};

#[derive(Clone)]
pub struct ClassesRepository {
    store: DocStore,
}

impl ClassesRepository {
    pub fn new(store: DocStore) -> Self {
        Self { store }
    }

    /// All classes, in insertion order
    pub async fn list(&self) -> AppResult<Vec<Class>> {
        let docs = self.store.query(CLASSES, &[]).await;
        docs.iter()
            .map(|doc| Class::from_document(doc).map_err(AppError::from))
            .collect()
    }

    /// Get class by ID
    pub async fn get(&self, id: &str) -> AppResult<Class> {
        let doc = self
            .store
            .get(CLASSES, id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Class {} not found", id)))?;
        Ok(Class::from_document(&doc)?)
    }

    /// Create a class
    pub async fn create(&self, name: &str) -> AppResult<Class> {
        let mut class = Class {
            id: String::new(),
            name: name.to_string(),
        };
        let id = self.store.add(CLASSES, encode_fields(&class)?).await;
        class.id = id;
        Ok(class)
    }

    /// Rename a class
    pub async fn update_name(&self, id: &str, name: &str) -> AppResult<Class> {
        self.store
            .update(CLASSES, id, Patch::new().set("name", name))
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_, _) => {
                    AppError::NotFound(format!("Class {} not found", id))
                }
                e => e.into(),
            })?;
        self.get(id).await
    }

    /// Delete a class
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.store.delete(CLASSES, id).await.map_err(|e| match e {
            StoreError::NotFound(_, _) => AppError::NotFound(format!("Class {} not found", id)),
            e => e.into(),
        })
    }
}
