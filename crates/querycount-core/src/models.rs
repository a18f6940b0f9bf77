//! Submission entity and strongly-typed identifier.
//!
//! A submission is append-only: the store assigns `id` and `date` on insert
//! and nothing mutates the row afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Strongly-typed submission identifier.
///
/// Assigned by the database sequence on insert. Strictly increasing for
/// sequential inserts.
///
/// # Example
///
/// ```
/// use querycount_core::SubmissionId;
/// let id = SubmissionId(7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct SubmissionId(pub i64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubmissionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A persisted code snippet submission.
///
/// Serializes to the wire shape
/// `{"id", "title", "codeSnippet", "aiReply", "date"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Store-assigned identifier
    pub id: SubmissionId,
    /// User-supplied title
    pub title: String,
    /// User-supplied code, unbounded length
    pub code_snippet: String,
    /// Reserved reply text; always empty for rows created by this service
    pub ai_reply: String,
    /// Insertion time taken from the database clock
    #[serde(rename = "date", with = "rfc3339_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Decoded body of a create request.
///
/// Missing and null fields decode to the empty string. Unknown fields,
/// including a client-supplied `id` or `date`, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    /// User-supplied title
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// User-supplied code
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code_snippet: String,
}

impl NewSubmission {
    /// Creates a new submission request.
    pub fn new(title: impl Into<String>, code_snippet: impl Into<String>) -> Self {
        Self { title: title.into(), code_snippet: code_snippet.into() }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339 timestamps truncated to whole seconds with an explicit offset.
mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, false))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
