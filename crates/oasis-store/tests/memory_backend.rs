//! Behavioral tests for the store contract, driven through [`StoreBackend`]
//! against the in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use oasis_store::{
    MemoryStore, RecordQuery, RowRange, StoreBackend, StoreCall, StoreError, StoreOp, record_id,
};
use oasis_types::{Bucket, Collection, Filter, Sort, SortDirection};
use serde_json::json;

async fn seeded_bookings(store: &StoreBackend, n: i64) {
    for i in 1..=n {
        let status = if i % 2 == 0 { "checked-in" } else { "unconfirmed" };
        store
            .create_record(
                Collection::Bookings,
                &json!({"status": status, "totalPrice": i * 100}),
            )
            .await
            .expect("seed booking");
    }
}

#[tokio::test]
async fn create_assigns_sequential_ids() {
    let store = StoreBackend::from(MemoryStore::new());

    let a = store
        .create_record(Collection::Cabins, &json!({"name": "001"}))
        .await
        .unwrap();
    let b = store
        .create_record(Collection::Cabins, &json!({"name": "002"}))
        .await
        .unwrap();

    assert_eq!(record_id(&a).unwrap(), 1);
    assert_eq!(record_id(&b).unwrap(), 2);
    assert_eq!(a["name"], "001");
}

#[tokio::test]
async fn update_merges_fields_and_keeps_id() {
    let store = StoreBackend::from(MemoryStore::new());
    let row = store
        .create_record(Collection::Cabins, &json!({"name": "001", "discount": 0}))
        .await
        .unwrap();
    let id = record_id(&row).unwrap();

    let updated = store
        .update_record(Collection::Cabins, id, &json!({"discount": 25, "id": 99}))
        .await
        .unwrap();

    assert_eq!(updated["id"], id);
    assert_eq!(updated["name"], "001");
    assert_eq!(updated["discount"], 25);
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let store = StoreBackend::from(MemoryStore::new());
    let result = store
        .update_record(Collection::Cabins, 404, &json!({"name": "x"}))
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn delete_removes_record() {
    let memory = MemoryStore::new();
    let store = StoreBackend::from(memory.clone());
    let row = store
        .create_record(Collection::Cabins, &json!({"name": "001"}))
        .await
        .unwrap();
    let id = record_id(&row).unwrap();

    store.delete_record(Collection::Cabins, id).await.unwrap();

    assert!(memory.records(Collection::Cabins).await.is_empty());
    let fetched = store.fetch_record(Collection::Cabins, id).await;
    assert!(matches!(fetched, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn query_returns_window_and_total_count() {
    let store = StoreBackend::from(MemoryStore::new());
    seeded_bookings(&store, 25).await;

    let page = store
        .query_records(
            Collection::Bookings,
            &RecordQuery {
                filter: Filter::All,
                sort: Some(Sort::new("totalPrice", SortDirection::Desc)),
                range: RowRange::for_page(2, 10),
            },
        )
        .await
        .unwrap();

    assert_eq!(page.count, 25);
    assert_eq!(page.rows.len(), 10);
    assert_eq!(page.rows[0]["totalPrice"], 1500);
    assert_eq!(page.rows[9]["totalPrice"], 600);
}

#[tokio::test]
async fn filtered_count_ignores_range() {
    let store = StoreBackend::from(MemoryStore::new());
    seeded_bookings(&store, 25).await;

    let page = store
        .query_records(
            Collection::Bookings,
            &RecordQuery {
                filter: Filter::equals("status", "checked-in"),
                sort: None,
                range: RowRange::for_page(1, 5),
            },
        )
        .await
        .unwrap();

    assert_eq!(page.count, 12);
    assert_eq!(page.rows.len(), 5);
    assert!(page.rows.iter().all(|r| r["status"] == "checked-in"));
}

#[tokio::test]
async fn upload_rejects_duplicate_names() {
    let memory = MemoryStore::new();
    let store = StoreBackend::from(memory.clone());

    store
        .upload_blob(Bucket::CabinImages, "a.jpg", b"first", "image/jpeg")
        .await
        .unwrap();
    let second = store
        .upload_blob(Bucket::CabinImages, "a.jpg", b"second", "image/jpeg")
        .await;

    assert!(matches!(second, Err(StoreError::Rejected { status: 409, .. })));
    assert_eq!(
        memory.blob(Bucket::CabinImages, "a.jpg").await.as_deref(),
        Some(&b"first"[..])
    );
}

#[tokio::test]
async fn injected_failure_leaves_state_untouched() {
    let memory = MemoryStore::new();
    let store = StoreBackend::from(memory.clone());
    memory.fail_next(StoreOp::Upload).await;

    let result = store
        .upload_blob(Bucket::CabinImages, "a.jpg", b"bytes", "image/jpeg")
        .await;

    assert!(matches!(result, Err(StoreError::Injected(_))));
    assert!(memory.blob(Bucket::CabinImages, "a.jpg").await.is_none());
    assert_eq!(
        memory.journal().await,
        vec![StoreCall::Upload {
            bucket: Bucket::CabinImages,
            name: "a.jpg".to_owned(),
        }]
    );
}

#[test]
fn memory_public_url_follows_storage_layout() {
    let store = StoreBackend::from(MemoryStore::new());
    assert_eq!(
        store.public_url(Bucket::CabinImages, "x.jpg"),
        "memory://oasis/storage/v1/object/public/cabin-images/x.jpg"
    );
}
