//! Ledger transaction engine
//!
//! The four state transitions of the inventory ledger: add, borrow,
//! return, delete. Each runs as one optimistic transaction mutating the
//! instance document and the owning item's aggregate counters together, so
//! no client ever observes one without the other. A lost commit race is
//! retried with a fresh read of the world, up to `TXN_MAX_ATTEMPTS`, then
//! surfaced as `TransactionConflict`.
//!
//! Counter adjustments are relative increments, except when an item still
//! lacks counters: then the transaction seeds all three as absolute values
//! recomputed from the item's instances, with the in-flight mutation
//! already accounted for.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        instance::Instance,
        item::Item,
    },
    repository::{encode_fields, Repository, INSTANCES, ITEMS},
    store::{Patch, Predicate, StoreError, Transaction},
};

use super::repair::recount;

/// Commit attempts before a conflict is surfaced to the caller
const TXN_MAX_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
}

impl LedgerService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new instance of an item. The new document and the item's
    /// counter bump become visible together or not at all.
    pub async fn add_instance(&self, tag: &str, item_id: &str) -> AppResult<Instance> {
        // Fast-path duplicate check; re-checked inside the transaction
        if self.repository.instances.find_by_tag(tag).await?.is_some() {
            return Err(AppError::DuplicateTag(tag.to_string()));
        }

        for attempt in 0..TXN_MAX_ATTEMPTS {
            let mut tx = self.repository.store.begin();

            // Uniqueness holds at commit: this query is validated against
            // the collection revision, so a racing add of the same tag
            // forces one side to retry and observe the other
            let duplicates = tx.query(INSTANCES, &[Predicate::eq("id", tag)]).await;
            if !duplicates.is_empty() {
                return Err(AppError::DuplicateTag(tag.to_string()));
            }

            let item_doc = tx
                .get(ITEMS, item_id)
                .await
                .ok_or_else(|| AppError::MissingItem(item_id.to_string()))?;
            let item = Item::from_document(&item_doc)?;

            match item.counters() {
                Some(_) => tx.update(
                    ITEMS,
                    item_id,
                    Patch::new()
                        .increment("totalCount", 1)
                        .increment("availableCount", 1),
                ),
                None => {
                    let mut counters = recount(&self.scan_item(&mut tx, item_id).await?);
                    counters.total += 1;
                    counters.available += 1;
                    tx.update(ITEMS, item_id, counters.to_patch());
                }
            }

            let instance = Instance {
                doc_id: String::new(),
                tag: tag.to_string(),
                item_id: item_id.to_string(),
                is_available: true,
                borrowed_by: None,
                borrowed_at: None,
            };
            let doc_id = tx.add(INSTANCES, encode_fields(&instance)?);

            match tx.commit().await {
                Ok(()) => {
                    return Ok(Instance {
                        doc_id,
                        ..instance
                    })
                }
                Err(StoreError::Conflict) => {
                    tracing::debug!(tag, attempt, "add lost a commit race, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::TransactionConflict)
    }

    /// Lend an instance to a class
    pub async fn borrow_instance(&self, tag: &str, class_id: &str) -> AppResult<Instance> {
        let looked_up = self.lookup(tag).await?;
        if !looked_up.is_available {
            return Err(AppError::AlreadyBorrowed(tag.to_string()));
        }

        for attempt in 0..TXN_MAX_ATTEMPTS {
            let mut tx = self.repository.store.begin();

            let instance = self.read_instance(&mut tx, &looked_up.doc_id, tag).await?;
            if !instance.is_available {
                return Err(AppError::AlreadyBorrowed(tag.to_string()));
            }

            let item_doc = tx
                .get(ITEMS, &instance.item_id)
                .await
                .ok_or_else(|| AppError::MissingItem(instance.item_id.clone()))?;
            let item = Item::from_document(&item_doc)?;

            let now = Utc::now();
            tx.update(
                INSTANCES,
                &instance.doc_id,
                Patch::new()
                    .set("isAvailable", false)
                    .set("borrowedBy", class_id)
                    .set("borrowedAt", now.to_rfc3339()),
            );

            match item.counters() {
                Some(_) => tx.update(
                    ITEMS,
                    &item.id,
                    Patch::new()
                        .increment("borrowedCount", 1)
                        .increment("availableCount", -1),
                ),
                None => {
                    // The scan still sees this instance as available;
                    // shift one unit to borrowed for the write in flight
                    let mut counters = recount(&self.scan_item(&mut tx, &item.id).await?);
                    counters.borrowed += 1;
                    counters.available -= 1;
                    tx.update(ITEMS, &item.id, counters.to_patch());
                }
            }

            match tx.commit().await {
                Ok(()) => {
                    return Ok(Instance {
                        is_available: false,
                        borrowed_by: Some(class_id.to_string()),
                        borrowed_at: Some(now),
                        ..instance
                    })
                }
                Err(StoreError::Conflict) => {
                    tracing::debug!(tag, attempt, "borrow lost a commit race, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::TransactionConflict)
    }

    /// Take an instance back from its borrower
    pub async fn return_instance(&self, tag: &str) -> AppResult<Instance> {
        let looked_up = self.lookup(tag).await?;
        if looked_up.is_available {
            return Err(AppError::AlreadyAvailable(tag.to_string()));
        }

        for attempt in 0..TXN_MAX_ATTEMPTS {
            let mut tx = self.repository.store.begin();

            let instance = self.read_instance(&mut tx, &looked_up.doc_id, tag).await?;
            if instance.is_available {
                return Err(AppError::AlreadyAvailable(tag.to_string()));
            }

            let item_doc = tx
                .get(ITEMS, &instance.item_id)
                .await
                .ok_or_else(|| AppError::MissingItem(instance.item_id.clone()))?;
            let item = Item::from_document(&item_doc)?;

            tx.update(
                INSTANCES,
                &instance.doc_id,
                Patch::new()
                    .set("isAvailable", true)
                    .set("borrowedBy", serde_json::Value::Null)
                    .set("borrowedAt", serde_json::Value::Null),
            );

            match item.counters() {
                Some(_) => tx.update(
                    ITEMS,
                    &item.id,
                    Patch::new()
                        .increment("borrowedCount", -1)
                        .increment("availableCount", 1),
                ),
                None => {
                    let mut counters = recount(&self.scan_item(&mut tx, &item.id).await?);
                    counters.borrowed -= 1;
                    counters.available += 1;
                    tx.update(ITEMS, &item.id, counters.to_patch());
                }
            }

            match tx.commit().await {
                Ok(()) => {
                    return Ok(Instance {
                        is_available: true,
                        borrowed_by: None,
                        borrowed_at: None,
                        ..instance
                    })
                }
                Err(StoreError::Conflict) => {
                    tracing::debug!(tag, attempt, "return lost a commit race, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::TransactionConflict)
    }

    /// Remove an instance in either state, keeping the counters in step
    pub async fn delete_instance(&self, tag: &str) -> AppResult<()> {
        let looked_up = self.lookup(tag).await?;

        for attempt in 0..TXN_MAX_ATTEMPTS {
            let mut tx = self.repository.store.begin();

            let instance = self.read_instance(&mut tx, &looked_up.doc_id, tag).await?;

            let item_doc = tx
                .get(ITEMS, &instance.item_id)
                .await
                .ok_or_else(|| AppError::MissingItem(instance.item_id.clone()))?;
            let item = Item::from_document(&item_doc)?;

            tx.delete(INSTANCES, &instance.doc_id);

            match item.counters() {
                Some(_) => {
                    let side = if instance.is_available {
                        "availableCount"
                    } else {
                        "borrowedCount"
                    };
                    tx.update(
                        ITEMS,
                        &item.id,
                        Patch::new().increment("totalCount", -1).increment(side, -1),
                    );
                }
                None => {
                    // Seed from the scan minus the instance being removed
                    let scan = self.scan_item(&mut tx, &item.id).await?;
                    let mut counters = recount(&scan);
                    counters.total -= 1;
                    if instance.is_available {
                        counters.available -= 1;
                    } else {
                        counters.borrowed -= 1;
                    }
                    tx.update(ITEMS, &item.id, counters.to_patch());
                }
            }

            match tx.commit().await {
                Ok(()) => return Ok(()),
                Err(StoreError::Conflict) => {
                    tracing::debug!(tag, attempt, "delete lost a commit race, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::TransactionConflict)
    }

    /// Non-transactional lookup by tag; the transaction re-reads the
    /// document it names before acting on it
    async fn lookup(&self, tag: &str) -> AppResult<Instance> {
        self.repository
            .instances
            .find_by_tag(tag)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Instance {} not found", tag)))
    }

    /// Transactional re-read of an instance by store identifier
    async fn read_instance(
        &self,
        tx: &mut Transaction,
        doc_id: &str,
        tag: &str,
    ) -> AppResult<Instance> {
        let doc = tx
            .get(INSTANCES, doc_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Instance {} not found", tag)))?;
        Ok(Instance::from_document(&doc)?)
    }

    /// Transactional scan of every instance of one item, for counter seeding
    async fn scan_item(&self, tx: &mut Transaction, item_id: &str) -> AppResult<Vec<Instance>> {
        let docs = tx
            .query(INSTANCES, &[Predicate::eq("itemId", item_id)])
            .await;
        docs.iter()
            .map(|doc| Instance::from_document(doc).map_err(AppError::from))
            .collect()
    }
}
