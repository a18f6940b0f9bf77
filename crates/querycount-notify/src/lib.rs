//! Best-effort webhook notification for newly created submissions.
//!
//! The API hands each new submission to a [`Notifier`] handle, which queues
//! it for a background worker that POSTs `{id, title, codeSnippet}` to the
//! configured endpoint. Nothing is retried and no outcome ever reaches the
//! request that triggered the notification.
//!
//! # Example
//!
//! ```no_run
//! use querycount_core::SubmissionId;
//! use querycount_notify::{Notifier, NotifierConfig};
//!
//! # async fn example() -> querycount_notify::Result<()> {
//! let config = NotifierConfig {
//!     webhook_url: Some("https://hooks.example.com/query-count".to_string()),
//!     ..NotifierConfig::default()
//! };
//! let (notifier, _worker) = Notifier::spawn(config)?;
//!
//! notifier.notify(SubmissionId(1), "fix loop", "for(i=0;i<n;i++)");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod notifier;

pub use client::{ClientConfig, WebhookClient, WebhookPayload};
pub use error::{NotifyError, Result};
pub use notifier::{Notifier, NotifierConfig};

/// Default HTTP timeout for a webhook call in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Default number of notifications that may wait for the worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
