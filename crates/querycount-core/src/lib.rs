//! Core domain model and record store for code snippet submissions.
//!
//! Defines the `Submission` entity, the error taxonomy for storage
//! operations, and the `SubmissionStore` abstraction with a PostgreSQL
//! repository and an in-memory implementation for tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;

pub use error::{CoreError, Result};
pub use models::{NewSubmission, Submission, SubmissionId};
pub use storage::{SubmissionStore, RECENT_LIMIT};
