//! Record store access for submissions.
//!
//! Handlers depend on the `SubmissionStore` trait rather than a concrete
//! pool so routing can be exercised against the in-memory store in `mock`.
//! The production implementation is the PostgreSQL repository in
//! `submissions`.
//!
//! No explicit transactions are issued. Each statement is assumed atomic and
//! isolation is left to the database engine.

use std::{future::Future, pin::Pin};

use crate::{
    error::Result,
    models::{NewSubmission, Submission, SubmissionId},
};

pub mod mock;
pub mod submissions;

pub use submissions::Repository;

/// Number of submissions returned by the recent listing.
pub const RECENT_LIMIT: usize = 5;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage operations required by the HTTP handlers.
pub trait SubmissionStore: Send + Sync + 'static {
    /// Returns up to `limit` submissions, newest first.
    ///
    /// Ordered by creation time descending with ties broken by id
    /// descending.
    fn list_recent(&self, limit: usize) -> StoreFuture<'_, Vec<Submission>>;

    /// Inserts a submission and returns the stored row.
    ///
    /// The creation time comes from the store's clock and `ai_reply` is
    /// always empty. The row is re-read by id after insert; if that read
    /// fails the error is `CoreError::InsertedRecordUnavailable` and the row
    /// remains persisted.
    fn create(&self, submission: NewSubmission) -> StoreFuture<'_, Submission>;

    /// Finds a submission by id.
    fn find_by_id(&self, id: SubmissionId) -> StoreFuture<'_, Option<Submission>>;
}
