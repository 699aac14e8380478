//! Optimistic transactions over the document store
//!
//! A transaction performs its reads against live state while recording what
//! it observed, stages its writes in memory, and validates the whole read
//! set under the write lock at commit. A reader whose observations went
//! stale gets `StoreError::Conflict` and nothing is applied; the caller
//! re-runs the transaction body from scratch.

use uuid::Uuid;

use super::{DocStore, Document, Fields, Patch, Predicate, StoreError};

#[derive(Debug)]
struct DocRead {
    collection: String,
    id: String,
    /// None records that the document was absent when read
    version: Option<u64>,
}

#[derive(Debug)]
struct QueryRead {
    collection: String,
    revision: u64,
}

#[derive(Debug)]
enum StagedWrite {
    Add {
        collection: String,
        id: String,
        fields: Fields,
    },
    Update {
        collection: String,
        id: String,
        patch: Patch,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// One all-or-nothing unit of reads and writes
pub struct Transaction {
    store: DocStore,
    doc_reads: Vec<DocRead>,
    query_reads: Vec<QueryRead>,
    writes: Vec<StagedWrite>,
}

impl Transaction {
    pub(crate) fn new(store: DocStore) -> Self {
        Self {
            store,
            doc_reads: Vec::new(),
            query_reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Transactional read of one document; its version (or absence) joins
    /// the read set
    pub async fn get(&mut self, collection: &str, id: &str) -> Option<Document> {
        let doc = self.store.inner.read().await.get(collection, id);
        self.doc_reads.push(DocRead {
            collection: collection.to_string(),
            id: id.to_string(),
            version: doc.as_ref().map(|d| d.version),
        });
        doc
    }

    /// Transactional query. Matched documents join the read set by version,
    /// and the collection revision guards against membership changes (a
    /// concurrent add or delete that would alter the result set).
    pub async fn query(&mut self, collection: &str, predicates: &[Predicate]) -> Vec<Document> {
        let inner = self.store.inner.read().await;
        let docs = inner.query(collection, predicates);
        self.query_reads.push(QueryRead {
            collection: collection.to_string(),
            revision: inner.revision(collection),
        });
        for doc in &docs {
            self.doc_reads.push(DocRead {
                collection: collection.to_string(),
                id: doc.id.clone(),
                version: Some(doc.version),
            });
        }
        docs
    }

    /// Stage a new document; returns its store identifier
    pub fn add(&mut self, collection: &str, fields: Fields) -> String {
        let id = Uuid::new_v4().to_string();
        self.writes.push(StagedWrite::Add {
            collection: collection.to_string(),
            id: id.clone(),
            fields,
        });
        id
    }

    /// Stage a patch against one document
    pub fn update(&mut self, collection: &str, id: &str, patch: Patch) {
        self.writes.push(StagedWrite::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            patch,
        });
    }

    /// Stage a deletion
    pub fn delete(&mut self, collection: &str, id: &str) {
        self.writes.push(StagedWrite::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
    }

    /// Validate the read set and apply all staged writes atomically
    pub async fn commit(self) -> Result<(), StoreError> {
        let mut inner = self.store.inner.write().await;

        for read in &self.query_reads {
            if inner.revision(&read.collection) != read.revision {
                return Err(StoreError::Conflict);
            }
        }
        for read in &self.doc_reads {
            if inner.version(&read.collection, &read.id) != read.version {
                return Err(StoreError::Conflict);
            }
        }

        // Write targets must exist before anything is applied, so a failed
        // transaction never leaves partial state behind
        for write in &self.writes {
            match write {
                StagedWrite::Update { collection, id, .. }
                | StagedWrite::Delete { collection, id } => {
                    if inner.version(collection, id).is_none() {
                        return Err(StoreError::NotFound(collection.clone(), id.clone()));
                    }
                }
                StagedWrite::Add { .. } => {}
            }
        }

        for write in self.writes {
            match write {
                StagedWrite::Add {
                    collection,
                    id,
                    fields,
                } => inner.insert(&collection, id, fields),
                StagedWrite::Update {
                    collection,
                    id,
                    patch,
                } => inner.patch(&collection, &id, &patch)?,
                StagedWrite::Delete { collection, id } => inner.remove(&collection, &id)?,
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("doc_reads", &self.doc_reads.len())
            .field("query_reads", &self.query_reads.len())
            .field("writes", &self.writes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn commit_applies_reads_and_writes_together() {
        let store = DocStore::new();
        let item = store
            .add("items", fields(json!({"label": "screen", "totalCount": 1})))
            .await;

        let mut tx = store.begin();
        let doc = tx.get("items", &item).await.unwrap();
        assert_eq!(doc.fields["totalCount"], json!(1));
        tx.update("items", &item, Patch::new().increment("totalCount", 1));
        let new_id = tx.add("instances", fields(json!({"id": "S-2", "itemId": item.clone()})));
        tx.commit().await.unwrap();

        let item_doc = store.get("items", &item).await.unwrap();
        assert_eq!(item_doc.fields["totalCount"], json!(2));
        assert!(store.get("instances", &new_id).await.is_some());
    }

    #[tokio::test]
    async fn stale_document_read_conflicts() {
        let store = DocStore::new();
        let item = store
            .add("items", fields(json!({"label": "mic", "totalCount": 0})))
            .await;

        let mut tx = store.begin();
        tx.get("items", &item).await.unwrap();
        tx.update("items", &item, Patch::new().increment("totalCount", 1));

        // A concurrent writer lands first
        store
            .update("items", &item, Patch::new().increment("totalCount", 1))
            .await
            .unwrap();

        assert!(matches!(tx.commit().await, Err(StoreError::Conflict)));
        // The losing transaction applied nothing
        let doc = store.get("items", &item).await.unwrap();
        assert_eq!(doc.fields["totalCount"], json!(1));
    }

    #[tokio::test]
    async fn membership_change_invalidates_query() {
        let store = DocStore::new();

        let mut tx = store.begin();
        let dupes = tx
            .query("instances", &[Predicate::eq("id", "T-1")])
            .await;
        assert!(dupes.is_empty());
        tx.add("instances", fields(json!({"id": "T-1"})));

        // Another add to the same collection commits first
        store.add("instances", fields(json!({"id": "T-1"}))).await;

        assert!(matches!(tx.commit().await, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn observed_absence_is_validated() {
        let store = DocStore::new();

        let mut tx = store.begin();
        assert!(tx.get("items", "ghost").await.is_none());
        tx.add("instances", fields(json!({"id": "G-1"})));

        store.set("items", "ghost", fields(json!({"label": "late"}))).await;

        assert!(matches!(tx.commit().await, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn delete_of_vanished_document_aborts_cleanly() {
        let store = DocStore::new();
        let id = store.add("items", fields(json!({"label": "x"}))).await;

        let mut tx = store.begin();
        tx.delete("items", &id);
        store.delete("items", &id).await.unwrap();

        // Surfaced as an error, nothing applied
        assert!(tx.commit().await.is_err());
    }
}
