//! In-memory submission store for testing.
//!
//! Mirrors the PostgreSQL repository's ordering and id assignment without a
//! database. Failures can be injected per operation to exercise the error
//! paths of callers.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreFuture, SubmissionStore};
use crate::{
    error::{CoreError, Result},
    models::{NewSubmission, Submission, SubmissionId},
};

/// Memory-backed `SubmissionStore`.
///
/// Ids start at 1 and increase by one per insert. Timestamps come from the
/// system clock and never go backwards relative to the previous insert.
#[derive(Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<Vec<Submission>>>,
    next_id: AtomicI64,
    list_error: Arc<RwLock<Option<String>>>,
    insert_error: Arc<RwLock<Option<String>>>,
    read_back_error: Arc<RwLock<Option<String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent listing fail with `message`.
    pub async fn inject_list_error(&self, message: impl Into<String>) {
        *self.list_error.write().await = Some(message.into());
    }

    /// Makes every subsequent insert fail before a row is written.
    pub async fn inject_insert_error(&self, message: impl Into<String>) {
        *self.insert_error.write().await = Some(message.into());
    }

    /// Makes every subsequent insert write its row but fail the read-back.
    pub async fn inject_read_back_error(&self, message: impl Into<String>) {
        *self.read_back_error.write().await = Some(message.into());
    }

    /// Clears all injected failures.
    pub async fn clear_errors(&self) {
        *self.list_error.write().await = None;
        *self.insert_error.write().await = None;
        *self.read_back_error.write().await = None;
    }

    /// Returns every stored row in insertion order.
    pub async fn rows(&self) -> Vec<Submission> {
        self.rows.read().await.clone()
    }

    /// Returns the number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns true when nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    async fn list_recent_impl(&self, limit: usize) -> Result<Vec<Submission>> {
        if let Some(message) = self.list_error.read().await.clone() {
            return Err(CoreError::Database(message));
        }

        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn create_impl(&self, submission: NewSubmission) -> Result<Submission> {
        if let Some(message) = self.insert_error.read().await.clone() {
            return Err(CoreError::Database(message));
        }

        let stored = {
            let mut rows = self.rows.write().await;
            let id = SubmissionId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            let now = Utc::now();
            let created_at = rows.last().map_or(now, |last| last.created_at.max(now));

            let stored = Submission {
                id,
                title: submission.title,
                code_snippet: submission.code_snippet,
                ai_reply: String::new(),
                created_at,
            };
            rows.push(stored.clone());
            stored
        };

        if let Some(message) = self.read_back_error.read().await.clone() {
            return Err(CoreError::InsertedRecordUnavailable { id: stored.id, message });
        }

        Ok(stored)
    }

    async fn find_by_id_impl(&self, id: SubmissionId) -> Result<Option<Submission>> {
        Ok(self.rows.read().await.iter().find(|row| row.id == id).cloned())
    }
}

impl SubmissionStore for MemoryStore {
    fn list_recent(&self, limit: usize) -> StoreFuture<'_, Vec<Submission>> {
        Box::pin(self.list_recent_impl(limit))
    }

    fn create(&self, submission: NewSubmission) -> StoreFuture<'_, Submission> {
        Box::pin(self.create_impl(submission))
    }

    fn find_by_id(&self, id: SubmissionId) -> StoreFuture<'_, Option<Submission>> {
        Box::pin(self.find_by_id_impl(id))
    }
}
