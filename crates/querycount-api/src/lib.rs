//! HTTP API for code snippet submissions.
//!
//! Two JSON routes sit behind a permissive CORS layer and every other path
//! falls through to static files:
//!
//! - `GET /api/queryCounts` lists the five most recent submissions
//! - `POST /api/queryCountCheck` stores a submission and queues a webhook
//!   notification

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use querycount_core::SubmissionStore;
use querycount_notify::Notifier;

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use config::Config;
pub use error::ApiError;
pub use server::{create_router, start_server, RouterOptions};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Record store for submissions
    pub store: Arc<dyn SubmissionStore>,
    /// Handle for best-effort webhook notification
    pub notifier: Notifier,
}

impl AppState {
    /// Creates application state from a store and a notifier handle.
    pub fn new(store: Arc<dyn SubmissionStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }
}
