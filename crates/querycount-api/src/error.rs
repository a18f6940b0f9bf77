//! Handler errors and their plain-text HTTP representation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use querycount_core::CoreError;
use thiserror::Error;
use tracing::error;

/// Errors returned by the JSON handlers.
///
/// Rendered as a plain-text body: 400 for undecodable input, 500 for any
/// storage failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body is not a valid submission document.
    #[error("{0}")]
    MalformedBody(String),

    /// Record store failed.
    #[error("{}", storage_message(.0))]
    Storage(#[from] CoreError),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn storage_message(err: &CoreError) -> String {
    match err {
        CoreError::InsertedRecordUnavailable { message, .. } => {
            format!("Error fetching inserted record: {message}")
        },
        other => format!("Database error: {other}"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
