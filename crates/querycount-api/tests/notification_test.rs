//! Webhook notification on submission create.

use std::time::Duration;

use axum::http::StatusCode;
use querycount_testing::TestEnv;
use serde_json::{json, Value};

const CREATE: &str = "/api/queryCountCheck";
const BODY: &str = r#"{"title":"fix loop","codeSnippet":"for(i=0;i<n;i++)"}"#;

fn without_date(mut submission: Value) -> Value {
    if let Some(fields) = submission.as_object_mut() {
        fields.remove("date");
    }
    submission
}

#[tokio::test]
async fn create_posts_submission_to_webhook() {
    let env = TestEnv::with_webhook(200).await.expect("test env setup");

    let response = env.post_json(CREATE, BODY).await.unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.json().unwrap();

    let bodies = env.http_mock.wait_for_requests(1, Duration::from_secs(5)).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "id": created["id"],
            "title": "fix loop",
            "codeSnippet": "for(i=0;i<n;i++)",
        })
    );
}

#[tokio::test]
async fn each_create_sends_one_notification() {
    let mut env = TestEnv::with_webhook(200).await.unwrap();

    for n in 0..3 {
        let body = json!({"title": format!("t{n}"), "codeSnippet": "c"}).to_string();
        let response = env.post_json(CREATE, body).await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
    }
    env.drain_notifier().await.unwrap();

    let mut ids: Vec<i64> = env
        .http_mock
        .received_bodies()
        .await
        .iter()
        .map(|body| body["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn failing_webhook_does_not_change_response() {
    let mut env = TestEnv::with_webhook(500).await.unwrap();

    let response = env.post_json(CREATE, BODY).await.unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json().unwrap()["title"], "fix loop");

    env.drain_notifier().await.unwrap();
    assert_eq!(env.http_mock.received_bodies().await.len(), 1);
    assert_eq!(env.store.len().await, 1);
}

#[tokio::test]
async fn response_is_identical_with_and_without_webhook() {
    let plain = TestEnv::new().await.unwrap();
    let notifying = TestEnv::with_webhook(200).await.unwrap();

    let without = plain.post_json(CREATE, BODY).await.unwrap();
    let with = notifying.post_json(CREATE, BODY).await.unwrap();

    assert_eq!(without.status, with.status);
    assert_eq!(without_date(without.json().unwrap()), without_date(with.json().unwrap()));
}

#[tokio::test]
async fn failed_create_sends_nothing() {
    let mut env = TestEnv::with_webhook(200).await.unwrap();
    env.store.inject_insert_error("disk full").await;

    let response = env.post_json(CREATE, BODY).await.unwrap();
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let response = env.post_json(CREATE, "{").await.unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    env.drain_notifier().await.unwrap();
    assert!(env.http_mock.received_bodies().await.is_empty());
}
