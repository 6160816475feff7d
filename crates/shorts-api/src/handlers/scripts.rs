//! Script generation handlers.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use shorts_models::VideoDraft;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Accepted video length range in seconds.
const MIN_LENGTH_SECS: u32 = 5;
const MAX_LENGTH_SECS: u32 = 180;

fn default_tone() -> String {
    "Engaging".to_string()
}

fn default_length() -> u32 {
    60
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_length")]
    pub length_seconds: u32,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Generate a script and store it as a new draft.
pub async fn generate_script(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Json<VideoDraft>> {
    let topic = req.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::validation("Topic must not be empty"));
    }
    if !(MIN_LENGTH_SECS..=MAX_LENGTH_SECS).contains(&req.length_seconds) {
        return Err(ApiError::validation(format!(
            "Length must be between {MIN_LENGTH_SECS} and {MAX_LENGTH_SECS} seconds"
        )));
    }

    let artifact = state
        .generator
        .generate(topic, &req.tone, req.length_seconds)
        .await;

    let mut draft = VideoDraft::new(
        topic,
        req.tone,
        req.length_seconds,
        artifact.title,
        artifact.hook,
        artifact.script,
        artifact.hashtags,
    );
    draft.scheduled_for = req.scheduled_for;

    let stored = state.store.insert_draft(draft).await?;
    info!(draft_id = %stored.id, topic, "Generated draft");
    Ok(Json(stored))
}
