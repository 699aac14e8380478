//! Instances repository

use crate::{
    error::{AppError, AppResult},
    models::instance::{Instance, InstanceFilter},
    store::{DocStore, Predicate},
};

use super::INSTANCES;

#[derive(Clone)]
pub struct InstancesRepository {
    store: DocStore,
}

impl InstancesRepository {
    pub fn new(store: DocStore) -> Self {
        Self { store }
    }

    /// All instances, in insertion order
    pub async fn list(&self) -> AppResult<Vec<Instance>> {
        self.find_filtered(&InstanceFilter::default()).await
    }

    /// Instances matching the filter; predicates are pushed down to the
    /// store's query layer rather than filtering the full collection here
    pub async fn find_filtered(&self, filter: &InstanceFilter) -> AppResult<Vec<Instance>> {
        let docs = self.store.query(INSTANCES, &filter.to_predicates()).await;
        docs.iter()
            .map(|doc| Instance::from_document(doc).map_err(AppError::from))
            .collect()
    }

    /// Look up an instance by its business tag (not its store identifier)
    pub async fn find_by_tag(&self, tag: &str) -> AppResult<Option<Instance>> {
        let docs = self.store.query(INSTANCES, &[Predicate::eq("id", tag)]).await;
        match docs.first() {
            Some(doc) => Ok(Some(Instance::from_document(doc)?)),
            None => Ok(None),
        }
    }
}
