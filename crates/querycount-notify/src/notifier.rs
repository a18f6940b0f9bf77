//! Notifier handle and background worker.
//!
//! Handlers call [`Notifier::notify`], which only enqueues. A single worker
//! task drains the queue and performs the HTTP calls. There is no delivery
//! guarantee: a full queue drops the notification, a failed call is logged
//! and forgotten, and anything still queued when the process exits is lost.

use std::time::Duration;

use querycount_core::SubmissionId;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    client::{ClientConfig, WebhookClient, WebhookPayload},
    error::Result,
};

/// Settings for the notifier.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Endpoint to POST to. `None` or blank disables notification.
    pub webhook_url: Option<String>,
    /// Timeout for each webhook request.
    pub timeout: Duration,
    /// User agent sent with each request.
    pub user_agent: String,
    /// Maximum notifications waiting for the worker.
    pub queue_capacity: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            webhook_url: None,
            timeout: client.timeout,
            user_agent: client.user_agent,
            queue_capacity: crate::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl NotifierConfig {
    /// Returns the trimmed webhook URL if notification is enabled.
    pub fn endpoint(&self) -> Option<&str> {
        self.webhook_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

/// Cloneable handle used by request handlers to submit notifications.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: Option<mpsc::Sender<WebhookPayload>>,
}

impl Notifier {
    /// Creates a handle that silently skips every notification.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Starts the background worker and returns its handle.
    ///
    /// Returns a disabled notifier and no worker when no endpoint is
    /// configured. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Configuration` if the HTTP client cannot be
    /// built.
    pub fn spawn(config: NotifierConfig) -> Result<(Self, Option<JoinHandle<()>>)> {
        let Some(url) = config.endpoint().map(str::to_string) else {
            info!("Webhook URL not configured, notifications disabled");
            return Ok((Self::disabled(), None));
        };

        let client = WebhookClient::new(ClientConfig {
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
        })?;

        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let worker = tokio::spawn(run_worker(client, url, receiver));

        Ok((Self { sender: Some(sender) }, Some(worker)))
    }

    /// Returns true when notifications are sent somewhere.
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queues a notification for a newly created submission.
    ///
    /// Never blocks and never fails from the caller's point of view.
    pub fn notify(&self, id: SubmissionId, title: &str, code_snippet: &str) {
        let Some(sender) = &self.sender else {
            debug!(submission_id = %id, "Webhook not configured, skipping notification");
            return;
        };

        let payload =
            WebhookPayload { id, title: title.to_string(), code_snippet: code_snippet.to_string() };

        match sender.try_send(payload) {
            Ok(()) => debug!(submission_id = %id, "Queued webhook notification"),
            Err(TrySendError::Full(_)) => {
                warn!(submission_id = %id, "Notification queue full, dropping webhook call");
            },
            Err(TrySendError::Closed(_)) => {
                warn!(submission_id = %id, "Notifier worker stopped, dropping webhook call");
            },
        }
    }
}

/// Sends queued notifications one at a time until every handle is dropped.
async fn run_worker(
    client: WebhookClient,
    url: String,
    mut receiver: mpsc::Receiver<WebhookPayload>,
) {
    info!(url = %url, "Notifier worker started");

    while let Some(payload) = receiver.recv().await {
        match client.send(&url, &payload).await {
            Ok(status) => {
                info!(submission_id = %payload.id, status, "Webhook called successfully");
            },
            Err(e) => {
                warn!(submission_id = %payload.id, error = %e, "Webhook notification failed");
            },
        }
    }

    info!("Notifier worker stopped");
}
