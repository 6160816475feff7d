//! Channel statistics handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use shorts_models::ChannelInfo;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChannelQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// Return the cached channel snapshot, refetching when asked to or when
/// nothing has been cached yet.
pub async fn get_channel(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<Json<ChannelInfo>> {
    if !query.refresh {
        if let Some(cached) = state.store.channel().await {
            return Ok(Json(cached));
        }
    }

    let info = state.tokens.refresh_channel().await?;
    Ok(Json(info))
}
