//! Two-phase cabin saves against the in-memory store, including injected
//! failures in each phase.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

mod common;

use oasis_core::{CabinDraft, Compensation, CoreError, ImageSource, ImageUpload};
use oasis_store::{StoreError, StoreOp};
use oasis_types::{Bucket, CabinId, Collection};
use rust_decimal_macros::dec;

use common::{ops, seed_cabin, session};

fn draft() -> CabinDraft {
    CabinDraft {
        id: None,
        name: "008".to_owned(),
        max_capacity: Some(10),
        regular_price: Some(dec!(1000)),
        discount: Some(dec!(100)),
        description: "Large cabin for big groups".to_owned(),
        image: Some(ImageSource::Pending(ImageUpload {
            file_name: "cabin-008.jpg".to_owned(),
            bytes: b"jpeg bytes".to_vec(),
            content_type: "image/jpeg".to_owned(),
        })),
    }
}

#[tokio::test]
async fn create_stores_record_and_image_under_same_name() {
    let (session, memory) = session(10);

    let cabin = session.cabins.save(draft()).await.unwrap();

    let prefix = "memory://oasis/storage/v1/object/public/cabin-images/";
    assert!(cabin.image.starts_with(prefix));
    let asset = cabin.image.trim_start_matches(prefix);
    assert!(asset.ends_with("-cabin-008.jpg"));

    assert_eq!(
        memory.blob(Bucket::CabinImages, asset).await.as_deref(),
        Some(&b"jpeg bytes"[..])
    );
    assert_eq!(memory.records(Collection::Cabins).await.len(), 1);
    assert_eq!(cabin.discount, dec!(100));
    assert_eq!(ops(&memory).await, vec![StoreOp::Create, StoreOp::Upload]);
}

#[tokio::test]
async fn unsafe_file_name_is_stored_and_linked_under_one_name() {
    let (session, memory) = session(10);
    let mut d = draft();
    d.image = Some(ImageSource::Pending(ImageUpload {
        file_name: "my cabin #2?.jpg".to_owned(),
        bytes: b"jpeg bytes".to_vec(),
        content_type: "image/jpeg".to_owned(),
    }));

    let cabin = session.cabins.save(d).await.unwrap();

    let prefix = "memory://oasis/storage/v1/object/public/cabin-images/";
    let asset = cabin.image.strip_prefix(prefix).unwrap();
    assert!(asset.ends_with("-my_cabin__2_.jpg"), "{asset}");
    assert!(!asset.contains(['#', '?', ' ']));
    assert!(memory.blob(Bucket::CabinImages, asset).await.is_some());
}

#[tokio::test]
async fn upload_failure_deletes_created_record() {
    let (session, memory) = session(10);
    memory.fail_next(StoreOp::Upload).await;

    let err = session.cabins.save(draft()).await.unwrap_err();

    let rollback = match err {
        CoreError::Rollback(rollback) => rollback,
        other => panic!("expected rollback, got {other:?}"),
    };
    assert!(rollback.compensated());
    assert!(matches!(rollback.cause, StoreError::Injected(_)));

    assert!(memory.records(Collection::Cabins).await.is_empty());
    assert_eq!(
        ops(&memory).await,
        vec![StoreOp::Create, StoreOp::Upload, StoreOp::Delete]
    );
}

#[tokio::test]
async fn failed_compensation_is_reported_with_original_cause() {
    let (session, memory) = session(10);
    memory.fail_next(StoreOp::Upload).await;
    memory.fail_next(StoreOp::Delete).await;

    let err = session.cabins.save(draft()).await.unwrap_err();

    let rollback = match err {
        CoreError::Rollback(rollback) => rollback,
        other => panic!("expected rollback, got {other:?}"),
    };
    assert!(!rollback.compensated());
    assert!(matches!(rollback.compensation, Compensation::Failed(_)));
    assert!(matches!(rollback.cause, StoreError::Injected(ref m) if m.contains("Upload")));
    assert_eq!(memory.records(Collection::Cabins).await.len(), 1);
}

#[tokio::test]
async fn record_write_failure_needs_no_compensation() {
    let (session, memory) = session(10);
    memory.fail_next(StoreOp::Create).await;

    let err = session.cabins.save(draft()).await.unwrap_err();

    assert!(matches!(err, CoreError::Store(StoreError::Injected(_))));
    assert_eq!(ops(&memory).await, vec![StoreOp::Create]);
    assert!(memory.records(Collection::Cabins).await.is_empty());
}

#[tokio::test]
async fn edit_with_stored_image_never_uploads() {
    let (session, memory) = session(10);
    let id = seed_cabin(&memory, 4).await;
    memory.clear_journal().await;

    let url = "memory://oasis/storage/v1/object/public/cabin-images/kept.jpg";
    let mut edit = draft();
    edit.id = Some(id);
    edit.image = Some(ImageSource::Stored(url.to_owned()));

    let cabin = session.cabins.save(edit).await.unwrap();

    assert_eq!(cabin.id, id);
    assert_eq!(cabin.image, url);
    assert_eq!(cabin.max_capacity, 10);
    assert_eq!(ops(&memory).await, vec![StoreOp::Update]);
}

#[tokio::test]
async fn edit_without_image_keeps_existing_url() {
    let (session, memory) = session(10);
    let id = seed_cabin(&memory, 4).await;

    let mut edit = draft();
    edit.id = Some(id);
    edit.image = None;

    let cabin = session.cabins.save(edit).await.unwrap();
    assert!(cabin.image.ends_with("/cabin-001.jpg"));
}

#[tokio::test]
async fn edit_upload_failure_deletes_record() {
    let (session, memory) = session(10);
    let id = seed_cabin(&memory, 4).await;
    memory.fail_next(StoreOp::Upload).await;

    let mut edit = draft();
    edit.id = Some(id);

    let err = session.cabins.save(edit).await.unwrap_err();

    assert!(matches!(err, CoreError::Rollback(ref r) if r.compensated()));
    assert!(session.cabins.get(id).await.is_err());
}

#[tokio::test]
async fn validation_failure_makes_no_store_calls() {
    let (session, memory) = session(10);
    let mut bad = draft();
    bad.discount = Some(dec!(1500));

    let err = session.cabins.save(bad).await.unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert!(memory.journal().await.is_empty());
}

#[tokio::test]
async fn save_invalidates_cached_catalog_even_on_rollback() {
    let (session, memory) = session(10);
    seed_cabin(&memory, 4).await;

    assert_eq!(session.cabins.list().await.unwrap().len(), 1);
    memory.clear_journal().await;
    assert_eq!(session.cabins.list().await.unwrap().len(), 1);
    assert!(memory.journal().await.is_empty(), "second list is cached");

    memory.fail_next(StoreOp::Upload).await;
    assert!(session.cabins.save(draft()).await.is_err());
    memory.clear_journal().await;

    assert_eq!(session.cabins.list().await.unwrap().len(), 1);
    assert_eq!(ops(&memory).await, vec![StoreOp::Query]);
}

#[tokio::test]
async fn delete_cabin_invalidates_catalog() {
    let (session, memory) = session(10);
    let id = seed_cabin(&memory, 4).await;
    seed_cabin(&memory, 2).await;

    assert_eq!(session.cabins.list().await.unwrap().len(), 2);
    session.cabins.delete(id).await.unwrap();
    assert_eq!(session.cabins.list().await.unwrap().len(), 1);

    let missing = session.cabins.get(CabinId(id.into_inner())).await;
    assert!(matches!(missing, Err(CoreError::Store(StoreError::NotFound(_)))));
}
