//! Submission listing and creation.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use querycount_core::{NewSubmission, Submission, RECENT_LIMIT};
use tracing::{debug, info, instrument, warn};

use crate::{error::ApiError, AppState};

/// Lists the most recent submissions, newest first.
///
/// Returns at most five entries and an empty array when nothing has been
/// submitted yet.
///
/// # Errors
///
/// Returns 500 with a plain-text body if the store query fails.
#[instrument(name = "list_recent_submissions", skip(state))]
pub async fn list_recent(State(state): State<AppState>) -> Result<Json<Vec<Submission>>, ApiError> {
    let submissions = state.store.list_recent(RECENT_LIMIT).await?;

    debug!(count = submissions.len(), "Listed recent submissions");
    Ok(Json(submissions))
}

/// Stores a new submission and queues a webhook notification.
///
/// The body is decoded regardless of its declared content type. The
/// notification is handed off before responding and its outcome never
/// affects the response.
///
/// # Errors
///
/// - 400 if the body is not a JSON submission document
/// - 500 if the insert or the read-back of the inserted row fails
#[instrument(name = "create_submission", skip(state, body), fields(body_len = body.len()))]
pub async fn create_submission(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let request: NewSubmission = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejecting malformed submission body");
        ApiError::MalformedBody(e.to_string())
    })?;

    let submission = state.store.create(request).await?;
    info!(submission_id = %submission.id, "Submission created");

    state.notifier.notify(submission.id, &submission.title, &submission.code_snippet);

    Ok((StatusCode::CREATED, Json(submission)))
}
