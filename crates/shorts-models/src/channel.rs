//! Cached channel metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Snapshot of the connected channel's profile and statistics.
///
/// Fully replaced on each successful fetch; absent when never fetched or
/// after a disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChannelInfo {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub subscriber_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub video_count: u64,
}
