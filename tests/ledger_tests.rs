//! End-to-end tests for the inventory ledger
//!
//! Every test runs against a fresh in-memory store, exercising the same
//! service stack the API handlers use.

use serde_json::json;

use kashidashi_server::config::AuthConfig;
use kashidashi_server::models::{Instance, ItemCounters};
use kashidashi_server::repository::Repository;
use kashidashi_server::services::repair::{CounterState, RepairEngine};
use kashidashi_server::services::Services;
use kashidashi_server::store::{DocStore, Fields};
use kashidashi_server::AppError;

fn setup() -> (DocStore, Repository, Services) {
    let store = DocStore::new();
    let repository = Repository::new(store.clone());
    let services = Services::new(repository.clone(), AuthConfig::default());
    (store, repository, services)
}

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

/// Raw counter read, bypassing the repair engine
async fn counters(repository: &Repository, item_id: &str) -> ItemCounters {
    repository
        .items
        .get(item_id)
        .await
        .unwrap()
        .counters()
        .expect("counters should be present")
}

fn assert_counters(c: ItemCounters, total: i64, borrowed: i64, available: i64) {
    assert_eq!((c.total, c.borrowed, c.available), (total, borrowed, available));
    assert_eq!(c.total, c.borrowed + c.available);
}

/// isAvailable is coupled to the borrower fields in both directions
fn assert_coupled(instance: &Instance) {
    assert_eq!(!instance.is_available, instance.borrowed_by.is_some());
    assert_eq!(!instance.is_available, instance.borrowed_at.is_some());
}

#[tokio::test]
async fn new_item_starts_with_zero_counters() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("projector").await.unwrap();
    assert_counters(counters(&repository, &item.id).await, 0, 0, 0);
}

#[tokio::test]
async fn add_borrow_return_round_trip() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("projector").await.unwrap();

    let added = services.ledger.add_instance("PROJ-1", &item.id).await.unwrap();
    assert!(added.is_available);
    assert_coupled(&added);
    assert_counters(counters(&repository, &item.id).await, 1, 0, 1);

    let class = services.catalog.create_class("1-A").await.unwrap();
    let borrowed = services
        .ledger
        .borrow_instance("PROJ-1", &class.id)
        .await
        .unwrap();
    assert!(!borrowed.is_available);
    assert_eq!(borrowed.borrowed_by.as_deref(), Some(class.id.as_str()));
    assert!(borrowed.borrowed_at.is_some());
    assert_coupled(&borrowed);
    assert_counters(counters(&repository, &item.id).await, 1, 1, 0);

    let returned = services.ledger.return_instance("PROJ-1").await.unwrap();
    assert!(returned.is_available);
    assert!(returned.borrowed_by.is_none());
    assert!(returned.borrowed_at.is_none());
    assert_coupled(&returned);
    // Item counters are back at their post-add values
    assert_counters(counters(&repository, &item.id).await, 1, 0, 1);

    // The stored document matches the post-add state exactly
    let stored = repository
        .instances
        .find_by_tag("PROJ-1")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_available);
    assert!(stored.borrowed_by.is_none());
    assert!(stored.borrowed_at.is_none());
}

#[tokio::test]
async fn projector_scenario() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("projector").await.unwrap();
    let class = services.catalog.create_class("A").await.unwrap();

    services.ledger.add_instance("PROJ-1", &item.id).await.unwrap();
    assert_counters(counters(&repository, &item.id).await, 1, 0, 1);

    services.ledger.add_instance("PROJ-2", &item.id).await.unwrap();
    assert_counters(counters(&repository, &item.id).await, 2, 0, 2);

    services
        .ledger
        .borrow_instance("PROJ-1", &class.id)
        .await
        .unwrap();
    assert_counters(counters(&repository, &item.id).await, 2, 1, 1);

    services.ledger.delete_instance("PROJ-2").await.unwrap();
    assert_counters(counters(&repository, &item.id).await, 1, 1, 0);

    services.ledger.return_instance("PROJ-1").await.unwrap();
    assert_counters(counters(&repository, &item.id).await, 1, 0, 1);
}

#[tokio::test]
async fn duplicate_tag_is_rejected_across_items() {
    let (_, repository, services) = setup();
    let item_a = services.catalog.create_item("mic").await.unwrap();
    let item_b = services.catalog.create_item("speaker").await.unwrap();

    services.ledger.add_instance("UNIT-1", &item_a.id).await.unwrap();
    let err = services
        .ledger
        .add_instance("UNIT-1", &item_b.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateTag(_)));

    // The failed add changed nothing on either item
    assert_counters(counters(&repository, &item_a.id).await, 1, 0, 1);
    assert_counters(counters(&repository, &item_b.id).await, 0, 0, 0);
}

#[tokio::test]
async fn add_to_missing_item_is_rejected() {
    let (_, _, services) = setup();
    let err = services
        .ledger
        .add_instance("GHOST-1", "no-such-item")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingItem(_)));
}

#[tokio::test]
async fn borrow_rejections_leave_state_unchanged() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("screen").await.unwrap();
    let class = services.catalog.create_class("2-B").await.unwrap();
    services.ledger.add_instance("SCR-1", &item.id).await.unwrap();

    let err = services
        .ledger
        .borrow_instance("SCR-9", &class.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    services.ledger.borrow_instance("SCR-1", &class.id).await.unwrap();

    // Borrowing a borrowed instance fails and changes nothing
    let err = services
        .ledger
        .borrow_instance("SCR-1", &class.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyBorrowed(_)));
    assert_counters(counters(&repository, &item.id).await, 1, 1, 0);

    let stored = repository
        .instances
        .find_by_tag("SCR-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.borrowed_by.as_deref(), Some(class.id.as_str()));
}

#[tokio::test]
async fn return_of_available_instance_is_rejected() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("table").await.unwrap();
    services.ledger.add_instance("TBL-1", &item.id).await.unwrap();

    let err = services.ledger.return_instance("TBL-1").await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyAvailable(_)));
    assert_counters(counters(&repository, &item.id).await, 1, 0, 1);
}

#[tokio::test]
async fn delete_of_borrowed_instance_decrements_borrowed() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("chair").await.unwrap();
    let class = services.catalog.create_class("3-A").await.unwrap();
    services.ledger.add_instance("CHR-1", &item.id).await.unwrap();
    services.ledger.add_instance("CHR-2", &item.id).await.unwrap();
    services.ledger.borrow_instance("CHR-1", &class.id).await.unwrap();

    services.ledger.delete_instance("CHR-1").await.unwrap();
    assert_counters(counters(&repository, &item.id).await, 1, 0, 1);

    assert!(repository
        .instances
        .find_by_tag("CHR-1")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn invariant_holds_through_mixed_sequence_with_failures() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("cable").await.unwrap();
    let class = services.catalog.create_class("1-C").await.unwrap();

    for n in 1..=4 {
        services
            .ledger
            .add_instance(&format!("CBL-{n}"), &item.id)
            .await
            .unwrap();
    }
    services.ledger.borrow_instance("CBL-1", &class.id).await.unwrap();
    services.ledger.borrow_instance("CBL-2", &class.id).await.unwrap();
    let _ = services.ledger.borrow_instance("CBL-1", &class.id).await; // rejected
    let _ = services.ledger.return_instance("CBL-3").await; // rejected
    let _ = services.ledger.add_instance("CBL-4", &item.id).await; // duplicate
    services.ledger.return_instance("CBL-2").await.unwrap();
    services.ledger.delete_instance("CBL-4").await.unwrap();

    let c = counters(&repository, &item.id).await;
    assert_counters(c, 3, 1, 2);

    for instance in repository.instances.list().await.unwrap() {
        assert_coupled(&instance);
    }
}

/// Legacy item documents lack counters; first read repairs and persists
#[tokio::test]
async fn legacy_item_is_repaired_on_first_read() {
    let (store, repository, services) = setup();

    let item_id = store.add("items", fields(json!({"label": "legacy"}))).await;
    for (tag, available) in [("LEG-1", true), ("LEG-2", true), ("LEG-3", false)] {
        let (by, at) = if available {
            (json!(null), json!(null))
        } else {
            (json!("some-class"), json!(chrono::Utc::now().to_rfc3339()))
        };
        store
            .add(
                "instances",
                fields(json!({
                    "id": tag,
                    "itemId": item_id,
                    "isAvailable": available,
                    "borrowedBy": by,
                    "borrowedAt": at,
                })),
            )
            .await;
    }

    // Raw read still has no counters
    assert!(repository.items.get(&item_id).await.unwrap().counters().is_none());

    let availability = services.catalog.item_availability().await.unwrap();
    let row = availability.iter().find(|r| r.id == item_id).unwrap();
    assert_eq!(row.total_count, 3);
    assert_eq!(row.borrowed_count, 1);
    assert_eq!(row.available_count, 2);

    // The repaired values were persisted to the item document
    assert_counters(counters(&repository, &item_id).await, 3, 1, 2);
}

#[tokio::test]
async fn repair_is_idempotent() {
    let (store, repository, _) = setup();
    let repair = RepairEngine::new(repository.clone());

    let item_id = store.add("items", fields(json!({"label": "legacy"}))).await;
    store
        .add(
            "instances",
            fields(json!({
                "id": "R-1",
                "itemId": item_id,
                "isAvailable": true,
                "borrowedBy": null,
                "borrowedAt": null,
            })),
        )
        .await;

    let item = repository.items.get(&item_id).await.unwrap();
    let first = repair.ensure_counters(&item).await.unwrap();
    assert!(matches!(first, CounterState::Repaired(_)));

    // Second run sees the persisted counters and does not rewrite them
    let item = repository.items.get(&item_id).await.unwrap();
    let second = repair.ensure_counters(&item).await.unwrap();
    assert!(matches!(second, CounterState::Fresh(_)));
    assert_eq!(first.counters(), second.counters());
}

/// A ledger write on a counter-less item seeds the counters without losing
/// the in-flight mutation
#[tokio::test]
async fn borrow_seeds_counters_on_legacy_item() {
    let (store, repository, services) = setup();

    let item_id = store.add("items", fields(json!({"label": "legacy"}))).await;
    for tag in ["L-1", "L-2"] {
        store
            .add(
                "instances",
                fields(json!({
                    "id": tag,
                    "itemId": item_id,
                    "isAvailable": true,
                    "borrowedBy": null,
                    "borrowedAt": null,
                })),
            )
            .await;
    }

    services.ledger.borrow_instance("L-1", "class-x").await.unwrap();
    assert_counters(counters(&repository, &item_id).await, 2, 1, 1);
}

#[tokio::test]
async fn concurrent_borrows_of_distinct_instances_both_land() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("speaker").await.unwrap();
    let class = services.catalog.create_class("2-A").await.unwrap();
    services.ledger.add_instance("SPK-1", &item.id).await.unwrap();
    services.ledger.add_instance("SPK-2", &item.id).await.unwrap();

    let (a, b) = tokio::join!(
        services.ledger.borrow_instance("SPK-1", &class.id),
        services.ledger.borrow_instance("SPK-2", &class.id),
    );
    a.unwrap();
    b.unwrap();

    // Both decrements landed; no lost update on the shared item document
    assert_counters(counters(&repository, &item.id).await, 2, 2, 0);
}

#[tokio::test]
async fn concurrent_borrows_of_same_instance_book_it_once() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("mic").await.unwrap();
    let class_a = services.catalog.create_class("A").await.unwrap();
    let class_b = services.catalog.create_class("B").await.unwrap();
    services.ledger.add_instance("MIC-1", &item.id).await.unwrap();

    let (a, b) = tokio::join!(
        services.ledger.borrow_instance("MIC-1", &class_a.id),
        services.ledger.borrow_instance("MIC-1", &class_b.id),
    );
    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(err, AppError::AlreadyBorrowed(_)));
        }
    }

    assert_counters(counters(&repository, &item.id).await, 1, 1, 0);
}

#[tokio::test]
async fn concurrent_adds_of_same_tag_create_one_instance() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("screen").await.unwrap();

    let (a, b) = tokio::join!(
        services.ledger.add_instance("SCR-1", &item.id),
        services.ledger.add_instance("SCR-1", &item.id),
    );
    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let hits = repository
        .instances
        .find_filtered(&kashidashi_server::models::InstanceFilter::for_item(&item.id))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_counters(counters(&repository, &item.id).await, 1, 0, 1);
}

#[tokio::test]
async fn filtered_lookup_matches_any_predicate_combination() {
    let (_, repository, services) = setup();
    let mic = services.catalog.create_item("mic").await.unwrap();
    let spk = services.catalog.create_item("speaker").await.unwrap();
    let class = services.catalog.create_class("1-A").await.unwrap();

    services.ledger.add_instance("MIC-1", &mic.id).await.unwrap();
    services.ledger.add_instance("MIC-2", &mic.id).await.unwrap();
    services.ledger.add_instance("SPK-1", &spk.id).await.unwrap();
    services.ledger.borrow_instance("MIC-2", &class.id).await.unwrap();

    use kashidashi_server::models::InstanceFilter;

    let available_mics = repository
        .instances
        .find_filtered(&InstanceFilter {
            item_id: Some(mic.id.clone()),
            is_available: Some(true),
            borrowed_by: None,
        })
        .await
        .unwrap();
    assert_eq!(available_mics.len(), 1);
    assert_eq!(available_mics[0].tag, "MIC-1");

    let held_by_class = repository
        .instances
        .find_filtered(&InstanceFilter {
            item_id: None,
            is_available: None,
            borrowed_by: Some(class.id.clone()),
        })
        .await
        .unwrap();
    assert_eq!(held_by_class.len(), 1);
    assert_eq!(held_by_class[0].tag, "MIC-2");
}

#[tokio::test]
async fn deleting_an_item_leaves_orphan_instances_in_place() {
    let (_, repository, services) = setup();
    let item = services.catalog.create_item("cord").await.unwrap();
    services.ledger.add_instance("CRD-1", &item.id).await.unwrap();

    services.catalog.delete_item(&item.id).await.unwrap();

    // The instance survives; ledger writes against it now fail loudly
    let orphan = repository
        .instances
        .find_by_tag("CRD-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(orphan.item_id, item.id);

    let err = services
        .ledger
        .borrow_instance("CRD-1", "any-class")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingItem(_)));
}
