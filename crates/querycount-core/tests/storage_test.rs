//! PostgreSQL repository tests.
//!
//! Each test runs against its own database created from `TEST_DATABASE_URL`.

use querycount_core::{NewSubmission, SubmissionId, RECENT_LIMIT};
use querycount_testing::TestDatabase;

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn create_reads_back_stored_row() {
    let db = TestDatabase::new().await.expect("test database");
    let repository = db.repository();

    let created =
        repository.create(&NewSubmission::new("fix loop", "for(i=0;i<n;i++)")).await.unwrap();

    assert!(created.id.0 > 0);
    assert_eq!(created.title, "fix loop");
    assert_eq!(created.code_snippet, "for(i=0;i<n;i++)");
    assert_eq!(created.ai_reply, "");
    assert_eq!(repository.find_by_id(created.id).await.unwrap(), Some(created));

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn list_recent_orders_newest_first_with_limit() {
    let db = TestDatabase::new().await.expect("test database");
    let repository = db.repository();

    let mut ids = Vec::new();
    for n in 0..7 {
        let created = repository.create(&NewSubmission::new(format!("t{n}"), "c")).await.unwrap();
        ids.push(created.id);
    }

    let recent = repository.list_recent(RECENT_LIMIT).await.unwrap();

    let listed: Vec<SubmissionId> = recent.iter().map(|s| s.id).collect();
    let expected: Vec<SubmissionId> = ids.iter().rev().take(5).copied().collect();
    assert_eq!(listed, expected);
    assert!(recent.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn list_recent_on_empty_table_is_empty() {
    let db = TestDatabase::new().await.expect("test database");

    assert!(db.repository().list_recent(RECENT_LIMIT).await.unwrap().is_empty());

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn find_by_id_missing_returns_none() {
    let db = TestDatabase::new().await.expect("test database");

    assert_eq!(db.repository().find_by_id(SubmissionId(9999)).await.unwrap(), None);

    db.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn ensure_schema_is_idempotent() {
    let db = TestDatabase::new().await.expect("test database");
    let repository = db.repository();
    repository.create(&NewSubmission::new("kept", "c")).await.unwrap();

    repository.ensure_schema().await.unwrap();
    repository.ensure_schema().await.unwrap();

    assert_eq!(repository.count().await.unwrap(), 1);
    repository.health_check().await.unwrap();

    db.cleanup().await.unwrap();
}
