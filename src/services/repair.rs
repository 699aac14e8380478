//! Counter repair engine
//!
//! Legacy item documents predate the aggregate counters. Any read that
//! needs them goes through here: present counters pass through untouched
//! (`Fresh`), absent ones are recomputed from a full scan of the item's
//! instances and persisted (`Repaired`). The write is best-effort and
//! non-transactional; a concurrent ledger commit on the same item can race
//! it, and the repair is idempotent, so the next read settles it.

use crate::{
    error::AppResult,
    models::{
        instance::{Instance, InstanceFilter},
        item::{Item, ItemCounters},
    },
    repository::Repository,
};

/// Outcome of a counter read, so callers can tell a silent repair apart
/// from a plain read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    Fresh(ItemCounters),
    Repaired(ItemCounters),
}

impl CounterState {
    pub fn counters(&self) -> ItemCounters {
        match *self {
            CounterState::Fresh(c) | CounterState::Repaired(c) => c,
        }
    }
}

/// Recount from an instance scan. `available` is derived, keeping the
/// `total == borrowed + available` invariant by construction.
pub fn recount(instances: &[Instance]) -> ItemCounters {
    let total = instances.len() as i64;
    let borrowed = instances.iter().filter(|i| !i.is_available).count() as i64;
    ItemCounters {
        total,
        borrowed,
        available: total - borrowed,
    }
}

#[derive(Clone)]
pub struct RepairEngine {
    repository: Repository,
}

impl RepairEngine {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Guarantee well-defined counters for the item, repairing if absent.
    /// Repairing an already-repaired item is a no-op by the absence check.
    pub async fn ensure_counters(&self, item: &Item) -> AppResult<CounterState> {
        if let Some(counters) = item.counters() {
            return Ok(CounterState::Fresh(counters));
        }

        let instances = self
            .repository
            .instances
            .find_filtered(&InstanceFilter::for_item(&item.id))
            .await?;
        let counters = recount(&instances);

        tracing::info!(
            item = %item.id,
            total = counters.total,
            borrowed = counters.borrowed,
            "repaired missing item counters"
        );
        self.repository.items.set_counters(&item.id, &counters).await?;

        Ok(CounterState::Repaired(counters))
    }
}
