//! Catalog service: item/class management and availability reads

use crate::{
    error::AppResult,
    models::{
        class::Class,
        instance::{Instance, InstanceFilter},
        item::{Item, ItemAvailability},
    },
    repository::Repository,
};

use super::repair::RepairEngine;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    repair: RepairEngine,
}

impl CatalogService {
    pub fn new(repository: Repository, repair: RepairEngine) -> Self {
        Self { repository, repair }
    }

    /// All items, counters guaranteed present (repaired on the way out)
    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        let mut items = self.repository.items.list().await?;
        for item in &mut items {
            let counters = self.repair.ensure_counters(item).await?.counters();
            item.total_count = Some(counters.total);
            item.borrowed_count = Some(counters.borrowed);
            item.available_count = Some(counters.available);
        }
        Ok(items)
    }

    /// Get one item with well-defined counters
    pub async fn get_item(&self, id: &str) -> AppResult<Item> {
        let mut item = self.repository.items.get(id).await?;
        let counters = self.repair.ensure_counters(&item).await?.counters();
        item.total_count = Some(counters.total);
        item.borrowed_count = Some(counters.borrowed);
        item.available_count = Some(counters.available);
        Ok(item)
    }

    pub async fn create_item(&self, label: &str) -> AppResult<Item> {
        self.repository.items.create(label).await
    }

    pub async fn update_item(&self, id: &str, label: &str) -> AppResult<Item> {
        self.repository.items.update_label(id, label).await
    }

    /// Delete an item. Dependent instances are left in place; the ledger
    /// treats them as orphans from here on.
    pub async fn delete_item(&self, id: &str) -> AppResult<()> {
        self.repository.items.delete(id).await
    }

    pub async fn list_classes(&self) -> AppResult<Vec<Class>> {
        self.repository.classes.list().await
    }

    pub async fn create_class(&self, name: &str) -> AppResult<Class> {
        self.repository.classes.create(name).await
    }

    pub async fn update_class(&self, id: &str, name: &str) -> AppResult<Class> {
        self.repository.classes.update_name(id, name).await
    }

    pub async fn delete_class(&self, id: &str) -> AppResult<()> {
        self.repository.classes.delete(id).await
    }

    /// Per-item availability for display. Reads the materialized counters
    /// only; instances are never rescanned on this path.
    pub async fn item_availability(&self) -> AppResult<Vec<ItemAvailability>> {
        let items = self.list_items().await?;
        Ok(items
            .into_iter()
            .map(|item| {
                // list_items repaired these
                let total = item.total_count.unwrap_or(0);
                let borrowed = item.borrowed_count.unwrap_or(0);
                let available = item.available_count.unwrap_or(0);
                ItemAvailability {
                    id: item.id,
                    label: item.label,
                    total_count: total,
                    borrowed_count: borrowed,
                    available_count: available,
                }
            })
            .collect())
    }

    /// Filtered instance retrieval for both admin and student flows
    pub async fn list_instances(&self, filter: &InstanceFilter) -> AppResult<Vec<Instance>> {
        self.repository.instances.find_filtered(filter).await
    }
}
