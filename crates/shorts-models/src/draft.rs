//! Video draft models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a video draft.
///
/// Ids are derived from the creation timestamp (millisecond precision) so
/// they sort in creation order; the store bumps the value on collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DraftId(pub String);

impl DraftId {
    /// Derive an id from a creation timestamp.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DraftId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DraftId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Draft lifecycle status.
///
/// Transitions are `draft -> scheduled` and `draft -> error`. Both targets
/// are terminal for this backend, but `error` may be retried by invoking
/// the schedule operation again on the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    /// Generated, not yet scheduled
    #[default]
    Draft,
    /// Publish metadata finalized and authorization validated
    Scheduled,
    /// Scheduling failed; retryable
    Error,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Draft => "draft",
            DraftStatus::Scheduled => "scheduled",
            DraftStatus::Error => "error",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform-ready metadata attached to a draft when it is scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PublishMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy_status: String,
}

/// A generated short-form video draft.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoDraft {
    /// Unique draft id
    pub id: DraftId,

    /// Topic the script was generated for
    pub topic: String,

    /// Requested tone (e.g. "Engaging")
    pub tone: String,

    /// Target video length in seconds
    pub length_seconds: u32,

    /// Generated title
    pub title: String,

    /// Opening hook line
    pub hook: String,

    /// Full script body
    pub script: String,

    /// Space-separated hashtag string (e.g. "#cooking #shorts")
    pub hashtags: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: DraftStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Client-requested publish time, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,

    /// When the draft transitioned to scheduled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Failure message from the last schedule attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Finalized publish metadata, populated on scheduling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_metadata: Option<PublishMetadata>,
}

impl VideoDraft {
    /// Create a new draft from generation output.
    pub fn new(
        topic: impl Into<String>,
        tone: impl Into<String>,
        length_seconds: u32,
        title: impl Into<String>,
        hook: impl Into<String>,
        script: impl Into<String>,
        hashtags: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DraftId::from_timestamp(now),
            topic: topic.into(),
            tone: tone.into(),
            length_seconds,
            title: title.into(),
            hook: hook.into(),
            script: script.into(),
            hashtags: hashtags.into(),
            status: DraftStatus::Draft,
            created_at: now,
            scheduled_for: None,
            scheduled_at: None,
            error: None,
            publish_metadata: None,
        }
    }

    /// Mark as scheduled with finalized publish metadata.
    pub fn schedule(mut self, metadata: PublishMetadata) -> Self {
        self.status = DraftStatus::Scheduled;
        self.scheduled_at = Some(Utc::now());
        self.error = None;
        self.publish_metadata = Some(metadata);
        self
    }

    /// Mark as failed with the scheduling error message.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = DraftStatus::Error;
        self.error = Some(error.into());
        self
    }
}
