//! In-process document store
//!
//! Collections of schemaless JSON documents with equality-predicate
//! queries, per-field patch updates and optimistic transactions. The rest
//! of the server only depends on these primitives, so a remote document
//! database offering the same contract could be swapped in behind the
//! repository layer.

pub mod seed;
mod transaction;

pub use transaction::Transaction;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors surfaced by the store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document {1} not found in collection {0}")]
    NotFound(String, String),

    #[error("write conflict, transaction aborted")]
    Conflict,

    #[error("invalid document: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Field map of a stored document
pub type Fields = serde_json::Map<String, Value>;

/// A document read from the store, with its store-owned identifier
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    pub(crate) version: u64,
}

impl Document {
    /// Deserialize the field map into a typed value
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Equality predicate for queries
#[derive(Debug, Clone)]
pub struct Predicate {
    field: String,
    value: Value,
}

impl Predicate {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }

    fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

/// A set of per-field operations applied atomically to one document
#[derive(Debug, Clone, Default)]
pub struct Patch {
    ops: Vec<(String, FieldOp)>,
}

#[derive(Debug, Clone)]
enum FieldOp {
    Set(Value),
    Increment(i64),
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.ops.push((field.to_string(), FieldOp::Set(value.into())));
        self
    }

    /// Relative increment; an absent or non-numeric field counts as zero
    pub fn increment(mut self, field: &str, delta: i64) -> Self {
        self.ops.push((field.to_string(), FieldOp::Increment(delta)));
        self
    }

    pub(crate) fn apply(&self, fields: &mut Fields) {
        for (field, op) in &self.ops {
            match op {
                FieldOp::Set(value) => {
                    fields.insert(field.clone(), value.clone());
                }
                FieldOp::Increment(delta) => {
                    let current = fields.get(field).and_then(Value::as_i64).unwrap_or(0);
                    fields.insert(field.clone(), Value::from(current + delta));
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct StoredDoc {
    version: u64,
    fields: Fields,
}

#[derive(Debug, Default)]
struct CollectionState {
    /// Insertion-ordered; removal shifts, so order is not stable across deletes
    docs: IndexMap<String, StoredDoc>,
    /// Bumped on membership changes (add/delete). Field updates are covered
    /// by per-document versions, so queries on immutable fields revalidate
    /// correctly against this alone.
    revision: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    collections: HashMap<String, CollectionState>,
}

impl StoreInner {
    fn collection_mut(&mut self, name: &str) -> &mut CollectionState {
        self.collections.entry(name.to_string()).or_default()
    }

    pub(crate) fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let doc = self.collections.get(collection)?.docs.get(id)?;
        Some(Document {
            id: id.to_string(),
            fields: doc.fields.clone(),
            version: doc.version,
        })
    }

    pub(crate) fn query(&self, collection: &str, predicates: &[Predicate]) -> Vec<Document> {
        let Some(state) = self.collections.get(collection) else {
            return Vec::new();
        };
        state
            .docs
            .iter()
            .filter(|(_, doc)| predicates.iter().all(|p| p.matches(&doc.fields)))
            .map(|(id, doc)| Document {
                id: id.clone(),
                fields: doc.fields.clone(),
                version: doc.version,
            })
            .collect()
    }

    pub(crate) fn revision(&self, collection: &str) -> u64 {
        self.collections
            .get(collection)
            .map(|c| c.revision)
            .unwrap_or(0)
    }

    pub(crate) fn version(&self, collection: &str, id: &str) -> Option<u64> {
        self.collections
            .get(collection)
            .and_then(|c| c.docs.get(id))
            .map(|d| d.version)
    }

    pub(crate) fn insert(&mut self, collection: &str, id: String, fields: Fields) {
        let state = self.collection_mut(collection);
        state.docs.insert(id, StoredDoc { version: 1, fields });
        state.revision += 1;
    }

    pub(crate) fn patch(&mut self, collection: &str, id: &str, patch: &Patch) -> Result<(), StoreError> {
        let state = self.collection_mut(collection);
        let doc = state
            .docs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(collection.to_string(), id.to_string()))?;
        patch.apply(&mut doc.fields);
        doc.version += 1;
        Ok(())
    }

    pub(crate) fn remove(&mut self, collection: &str, id: &str) -> Result<(), StoreError> {
        let state = self.collection_mut(collection);
        state
            .docs
            .shift_remove(id)
            .ok_or_else(|| StoreError::NotFound(collection.to_string(), id.to_string()))?;
        state.revision += 1;
        Ok(())
    }
}

/// Handle to the shared document store
#[derive(Clone, Default)]
pub struct DocStore {
    pub(crate) inner: Arc<RwLock<StoreInner>>,
}

impl DocStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get one document by its store identifier
    pub async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.inner.read().await.get(collection, id)
    }

    /// All documents matching every predicate, in insertion order
    pub async fn query(&self, collection: &str, predicates: &[Predicate]) -> Vec<Document> {
        self.inner.read().await.query(collection, predicates)
    }

    /// Add a document with a store-generated identifier
    pub async fn add(&self, collection: &str, fields: Fields) -> String {
        let id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .await
            .insert(collection, id.clone(), fields);
        id
    }

    /// Create or replace a document under a caller-chosen identifier
    pub async fn set(&self, collection: &str, id: &str, fields: Fields) {
        self.inner
            .write()
            .await
            .insert(collection, id.to_string(), fields);
    }

    /// Apply a patch to one document; atomic per document
    pub async fn update(&self, collection: &str, id: &str, patch: Patch) -> Result<(), StoreError> {
        self.inner.write().await.patch(collection, id, &patch)
    }

    /// Delete one document
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.write().await.remove(collection, id)
    }

    /// Begin an optimistic transaction
    pub fn begin(&self) -> Transaction {
        Transaction::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn add_then_get_roundtrip() {
        let store = DocStore::new();
        let id = store
            .add("items", fields(json!({"label": "projector"})))
            .await;

        let doc = store.get("items", &id).await.expect("document exists");
        assert_eq!(doc.fields["label"], json!("projector"));
    }

    #[tokio::test]
    async fn query_filters_by_equality() {
        let store = DocStore::new();
        store
            .add("instances", fields(json!({"id": "A-1", "itemId": "x"})))
            .await;
        store
            .add("instances", fields(json!({"id": "A-2", "itemId": "y"})))
            .await;

        let hits = store
            .query("instances", &[Predicate::eq("itemId", "x")])
            .await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].fields["id"], json!("A-1"));

        let all = store.query("instances", &[]).await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn listing_preserves_insertion_order() {
        let store = DocStore::new();
        for n in 0..5 {
            store
                .add("classes", fields(json!({"name": format!("class-{n}")})))
                .await;
        }

        let names: Vec<String> = store
            .query("classes", &[])
            .await
            .iter()
            .map(|d| d.fields["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["class-0", "class-1", "class-2", "class-3", "class-4"]);
    }

    #[tokio::test]
    async fn patch_increments_and_sets() {
        let store = DocStore::new();
        let id = store
            .add("items", fields(json!({"label": "mic", "totalCount": 2})))
            .await;

        store
            .update(
                "items",
                &id,
                Patch::new()
                    .increment("totalCount", 1)
                    .set("label", "microphone"),
            )
            .await
            .unwrap();

        let doc = store.get("items", &id).await.unwrap();
        assert_eq!(doc.fields["totalCount"], json!(3));
        assert_eq!(doc.fields["label"], json!("microphone"));
    }

    #[tokio::test]
    async fn increment_treats_absent_field_as_zero() {
        let store = DocStore::new();
        let id = store.add("items", fields(json!({"label": "cable"}))).await;

        store
            .update("items", &id, Patch::new().increment("totalCount", 4))
            .await
            .unwrap();

        let doc = store.get("items", &id).await.unwrap();
        assert_eq!(doc.fields["totalCount"], json!(4));
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = DocStore::new();
        let err = store
            .update("items", "nope", Patch::new().set("label", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_, _)));
    }
}
