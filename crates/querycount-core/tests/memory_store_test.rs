//! Behavior of the in-memory store that backs the router tests.

use querycount_core::{
    storage::mock::MemoryStore, CoreError, NewSubmission, SubmissionId, SubmissionStore,
    RECENT_LIMIT,
};

async fn insert(store: &MemoryStore, title: &str) -> querycount_core::Submission {
    store.create(NewSubmission::new(title, "code")).await.expect("insert should succeed")
}

#[tokio::test]
async fn assigns_increasing_ids_from_one() {
    let store = MemoryStore::new();

    let first = insert(&store, "a").await;
    let second = insert(&store, "b").await;

    assert_eq!(first.id, SubmissionId(1));
    assert_eq!(second.id, SubmissionId(2));
    assert!(second.created_at >= first.created_at);
    assert_eq!(first.ai_reply, "");
}

#[tokio::test]
async fn list_recent_is_newest_first_and_limited() {
    let store = MemoryStore::new();
    for n in 0..7 {
        insert(&store, &format!("t{n}")).await;
    }

    let recent = store.list_recent(RECENT_LIMIT).await.unwrap();

    let ids: Vec<i64> = recent.iter().map(|s| s.id.0).collect();
    assert_eq!(ids, vec![7, 6, 5, 4, 3]);
}

#[tokio::test]
async fn list_recent_on_empty_store_is_empty() {
    let store = MemoryStore::new();

    assert!(store.list_recent(RECENT_LIMIT).await.unwrap().is_empty());
}

#[tokio::test]
async fn find_by_id_returns_stored_row() {
    let store = MemoryStore::new();
    let created = insert(&store, "lookup").await;

    assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(created));
    assert_eq!(store.find_by_id(SubmissionId(42)).await.unwrap(), None);
}

#[tokio::test]
async fn injected_insert_error_writes_nothing() {
    let store = MemoryStore::new();
    store.inject_insert_error("constraint violated").await;

    let err = store.create(NewSubmission::new("t", "c")).await.unwrap_err();

    assert!(matches!(err, CoreError::Database(ref message) if message == "constraint violated"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn injected_read_back_error_keeps_row() {
    let store = MemoryStore::new();
    store.inject_read_back_error("connection reset").await;

    let err = store.create(NewSubmission::new("t", "c")).await.unwrap_err();

    assert!(err.is_read_back_failure());
    assert_eq!(store.len().await, 1);
    assert_eq!(store.rows().await[0].title, "t");
}

#[tokio::test]
async fn clear_errors_restores_normal_operation() {
    let store = MemoryStore::new();
    store.inject_list_error("down").await;
    assert!(store.list_recent(RECENT_LIMIT).await.is_err());

    store.clear_errors().await;

    assert!(store.list_recent(RECENT_LIMIT).await.is_ok());
}
