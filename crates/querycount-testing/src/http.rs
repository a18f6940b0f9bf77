//! HTTP mocking utilities for webhook testing.

use std::time::{Duration, Instant};

use serde_json::Value;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer as WiremockServer, ResponseTemplate,
};

/// Mock webhook receiver.
pub struct MockServer {
    server: WiremockServer,
}

impl MockServer {
    /// Starts a new mock server on a random port.
    pub async fn start() -> Self {
        Self { server: WiremockServer::start().await }
    }

    /// Returns the full URL for `path` on this server.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Answers every POST to `endpoint` with `status`.
    pub async fn mock_webhook(&self, endpoint: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Returns the JSON bodies of every request received so far.
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Polls until at least `expected` requests arrived or `timeout` passes.
    ///
    /// Returns whatever bodies were received by then.
    pub async fn wait_for_requests(&self, expected: usize, timeout: Duration) -> Vec<Value> {
        let deadline = Instant::now() + timeout;
        loop {
            let bodies = self.received_bodies().await;
            if bodies.len() >= expected || Instant::now() >= deadline {
                return bodies;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}
