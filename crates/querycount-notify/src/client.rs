//! HTTP client for webhook calls.
//!
//! Sends one JSON POST per notification and classifies the outcome. The
//! client never retries; the caller decides what to do with the error, which
//! in this service means logging it.

use std::time::{Duration, Instant};

use querycount_core::SubmissionId;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

use crate::error::{NotifyError, Result};

/// Configuration for the webhook client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for a single webhook request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            user_agent: concat!("querycount/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Body posted to the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Identifier of the new submission
    pub id: SubmissionId,
    /// Submission title
    pub title: String,
    /// Submitted code
    pub code_snippet: String,
}

/// Thin wrapper over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl WebhookClient {
    /// Creates a webhook client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Configuration` if the HTTP client cannot be
    /// built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NotifyError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Posts `payload` as JSON to `url` and returns the response status.
    ///
    /// # Errors
    ///
    /// - `Serialization` if the payload cannot be encoded
    /// - `Timeout` if the request exceeds the configured timeout
    /// - `Network` for connection and protocol failures
    /// - `Rejected` for any non-2xx response
    pub async fn send(&self, url: &str, payload: &WebhookPayload) -> Result<u16> {
        let span = info_span!("webhook_notify", submission_id = %payload.id, url = %url);

        async move {
            let body = serde_json::to_vec(payload)
                .map_err(|e| NotifyError::serialization(e.to_string()))?;

            let start_time = Instant::now();
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        NotifyError::timeout(self.config.timeout.as_secs())
                    } else {
                        NotifyError::network(e.to_string())
                    }
                })?;

            let status = response.status();
            debug!(
                status = status.as_u16(),
                duration_ms = start_time.elapsed().as_millis(),
                "Received webhook response"
            );

            if status.is_success() {
                Ok(status.as_u16())
            } else {
                Err(NotifyError::rejected(status.as_u16()))
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn payload() -> WebhookPayload {
        WebhookPayload {
            id: SubmissionId(12),
            title: "fix loop".to_string(),
            code_snippet: "for(i=0;i<n;i++)".to_string(),
        }
    }

    #[test]
    fn payload_uses_camel_case_fields() {
        let value = serde_json::to_value(payload()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 12, "title": "fix loop", "codeSnippet": "for(i=0;i<n;i++)"})
        );
    }

    #[tokio::test]
    async fn posts_json_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::to_value(payload()).unwrap()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebhookClient::new(ClientConfig::default()).unwrap();
        let status = client.send(&format!("{}/hook", server.uri()), &payload()).await.unwrap();

        assert_eq!(status, 204);
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebhookClient::new(ClientConfig::default()).unwrap();
        let result = client.send(&server.uri(), &payload()).await;

        assert!(matches!(result, Err(NotifyError::Rejected { status_code: 500 })));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let config = ClientConfig { timeout: Duration::from_millis(100), ..Default::default() };
        let client = WebhookClient::new(config).unwrap();
        let result = client.send(&server.uri(), &payload()).await;

        assert!(matches!(result, Err(NotifyError::Timeout { .. })));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let client = WebhookClient::new(ClientConfig::default()).unwrap();
        let result = client.send("http://127.0.0.1:1/hook", &payload()).await;

        assert!(matches!(result, Err(NotifyError::Network { .. })));
    }
}
