//! Test infrastructure for the querycount workspace.
//!
//! `TestEnv` wires the real router to an in-memory store, a disposable
//! static directory and a wiremock server standing in for the webhook
//! endpoint. `TestDatabase` provides an isolated PostgreSQL database for
//! repository tests.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use querycount_api::{create_router, AppState, RouterOptions};
use querycount_core::storage::mock::MemoryStore;
use querycount_notify::{Notifier, NotifierConfig};
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use uuid::Uuid;

pub mod database;
pub mod http;

pub use database::TestDatabase;
pub use http::MockServer;

/// Path the webhook mock listens on.
pub const WEBHOOK_PATH: &str = "/hooks/query-count";

/// Test environment around the production router.
pub struct TestEnv {
    /// In-memory record store shared with the router
    pub store: Arc<MemoryStore>,
    /// HTTP mock server for the webhook endpoint
    pub http_mock: MockServer,
    notifier: Notifier,
    notifier_worker: Option<JoinHandle<()>>,
    static_dir: PathBuf,
}

impl TestEnv {
    /// Creates an environment with webhook notification disabled.
    pub async fn new() -> Result<Self> {
        init_tracing();

        let static_dir = std::env::temp_dir().join(format!("querycount-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&static_dir).context("failed to create static directory")?;

        Ok(Self {
            store: Arc::new(MemoryStore::new()),
            http_mock: MockServer::start().await,
            notifier: Notifier::disabled(),
            notifier_worker: None,
            static_dir,
        })
    }

    /// Creates an environment whose notifier posts to the mock server at
    /// [`WEBHOOK_PATH`], which answers with `status`.
    pub async fn with_webhook(status: u16) -> Result<Self> {
        let mut env = Self::new().await?;
        env.http_mock.mock_webhook(WEBHOOK_PATH, status).await;

        let config = NotifierConfig {
            webhook_url: Some(env.http_mock.endpoint_url(WEBHOOK_PATH)),
            timeout: Duration::from_secs(2),
            ..NotifierConfig::default()
        };
        let (notifier, worker) = Notifier::spawn(config).context("failed to spawn notifier")?;
        env.notifier = notifier;
        env.notifier_worker = worker;
        Ok(env)
    }

    /// Returns the application state handed to the router.
    pub fn state(&self) -> AppState {
        AppState::new(self.store.clone(), self.notifier.clone())
    }

    /// Builds the production router over this environment.
    pub fn router(&self) -> Router {
        let options = RouterOptions {
            static_dir: self.static_dir.clone(),
            request_timeout: Duration::from_secs(5),
        };
        create_router(self.state(), &options)
    }

    /// Writes a file into the static directory.
    pub fn write_static_file(&self, name: &str, contents: &str) -> Result<()> {
        std::fs::write(self.static_dir.join(name), contents)
            .with_context(|| format!("failed to write static file {name}"))
    }

    /// Sends a request through a fresh router.
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router().oneshot(request).await.context("router call failed")?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("failed to read response body")?;

        Ok(TestResponse { status, headers, body })
    }

    /// Issues a GET request.
    pub async fn get(&self, path: &str) -> Result<TestResponse> {
        self.send(Request::builder().method(Method::GET).uri(path).body(Body::empty())?).await
    }

    /// Issues an OPTIONS request.
    pub async fn options(&self, path: &str) -> Result<TestResponse> {
        self.send(Request::builder().method(Method::OPTIONS).uri(path).body(Body::empty())?).await
    }

    /// Issues a POST request with a JSON content type and a raw body.
    pub async fn post_json(&self, path: &str, body: impl Into<String>) -> Result<TestResponse> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))?;
        self.send(request).await
    }

    /// Drops the notifier and waits for its worker to drain the queue.
    pub async fn drain_notifier(&mut self) -> Result<()> {
        self.notifier = Notifier::disabled();
        if let Some(worker) = self.notifier_worker.take() {
            tokio::time::timeout(Duration::from_secs(5), worker)
                .await
                .context("notifier worker did not stop")?
                .context("notifier worker panicked")?;
        }
        Ok(())
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.static_dir);
    }
}

/// Buffered response from the router.
#[derive(Debug)]
pub struct TestResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Full response body
    pub body: Bytes,
}

impl TestResponse {
    /// Parses the body as JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).context("response body is not JSON")
    }

    /// Returns the body as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns a header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .with_test_writer()
        .try_init();
}
