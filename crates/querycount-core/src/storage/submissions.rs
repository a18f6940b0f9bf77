//! PostgreSQL repository for the submissions table.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, warn};

use super::{StoreFuture, SubmissionStore};
use crate::{
    error::{CoreError, Result},
    models::{NewSubmission, Submission, SubmissionId},
};

/// Repository for submission database operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Creates the submissions table and its ordering index if absent.
    ///
    /// # Errors
    ///
    /// Returns error if either DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS query_count_submissions (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                code_snippet TEXT NOT NULL,
                ai_reply TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&*self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_query_count_submissions_created
            ON query_count_submissions(created_at DESC)
            ",
        )
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Lists the most recent submissions.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Submission>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, Submission>(
            r"
            SELECT id, title, code_snippet, ai_reply, created_at
            FROM query_count_submissions
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a submission stamped with the database clock, then re-reads
    /// it by id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the insert fails and
    /// `CoreError::InsertedRecordUnavailable` if the read-back fails.
    pub async fn create(&self, submission: &NewSubmission) -> Result<Submission> {
        let id: SubmissionId = sqlx::query_scalar(
            r"
            INSERT INTO query_count_submissions (title, code_snippet, ai_reply, created_at)
            VALUES ($1, $2, '', NOW())
            RETURNING id
            ",
        )
        .bind(&submission.title)
        .bind(&submission.code_snippet)
        .fetch_one(&*self.pool)
        .await?;

        debug!(submission_id = %id, "Inserted submission");

        match self.find_by_id(id).await {
            Ok(Some(stored)) => Ok(stored),
            Ok(None) => {
                warn!(submission_id = %id, "Inserted submission missing on read-back");
                Err(CoreError::InsertedRecordUnavailable {
                    id,
                    message: "row not found after insert".to_string(),
                })
            },
            Err(e) => {
                warn!(submission_id = %id, error = %e, "Failed to read back inserted submission");
                Err(CoreError::InsertedRecordUnavailable { id, message: e.to_string() })
            },
        }
    }

    /// Finds a submission by id.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn find_by_id(&self, id: SubmissionId) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r"
            SELECT id, title, code_snippet, ai_reply, created_at
            FROM query_count_submissions
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(submission)
    }

    /// Counts all submissions.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM query_count_submissions")
            .fetch_one(&*self.pool)
            .await?;

        Ok(count)
    }

    /// Executes a trivial query to verify connectivity.
    ///
    /// # Errors
    ///
    /// Returns error if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.pool).await?;
        Ok(())
    }
}

impl SubmissionStore for Repository {
    fn list_recent(&self, limit: usize) -> StoreFuture<'_, Vec<Submission>> {
        Box::pin(async move { Repository::list_recent(self, limit).await })
    }

    fn create(&self, submission: NewSubmission) -> StoreFuture<'_, Submission> {
        Box::pin(async move { Repository::create(self, &submission).await })
    }

    fn find_by_id(&self, id: SubmissionId) -> StoreFuture<'_, Option<Submission>> {
        Box::pin(async move { Repository::find_by_id(self, id).await })
    }
}
