//! Video draft handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use shorts_models::{DraftId, VideoDraft};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct DraftListResponse {
    pub videos: Vec<VideoDraft>,
}

/// List drafts, newest first.
pub async fn list_videos(State(state): State<AppState>) -> Json<DraftListResponse> {
    Json(DraftListResponse {
        videos: state.store.list_drafts().await,
    })
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Delete a draft by id. Deleting a missing id succeeds with
/// `deleted: false`.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state
        .store
        .delete_draft(&DraftId::from_string(video_id))
        .await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// Schedule a draft: finalize publish metadata under a valid token.
pub async fn schedule_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoDraft>> {
    let draft = state
        .scheduler
        .schedule(&DraftId::from_string(video_id))
        .await?;
    Ok(Json(draft))
}
