//! Read-only channel profile/statistics fetch.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use shorts_models::ChannelInfo;

use crate::error::{YoutubeError, YoutubeResult};

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Client for the platform's channel-info endpoint.
pub struct ChannelClient {
    http: Client,
    base_url: String,
}

// The platform returns statistics counts as JSON strings.
#[derive(Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Deserialize)]
struct ChannelItem {
    id: String,
    snippet: ChannelSnippet,
    #[serde(default)]
    statistics: Option<ChannelStatistics>,
}

#[derive(Deserialize)]
struct ChannelSnippet {
    title: String,
    #[serde(rename = "customUrl", default)]
    custom_url: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Deserialize)]
struct Thumbnails {
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize, Default)]
struct ChannelStatistics {
    #[serde(rename = "subscriberCount", default)]
    subscriber_count: Option<String>,
    #[serde(rename = "viewCount", default)]
    view_count: Option<String>,
    #[serde(rename = "videoCount", default)]
    video_count: Option<String>,
}

impl ChannelClient {
    /// Create a client against the real API.
    pub fn new() -> YoutubeResult<Self> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Create a client against a custom base URL (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> YoutubeResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Fetch the authenticated account's channel snapshot.
    pub async fn fetch_mine(&self, access_token: &str) -> YoutubeResult<ChannelInfo> {
        let url = format!(
            "{}/channels?part=snippet%2Cstatistics&mine=true",
            self.base_url
        );
        let response = self.http.get(&url).bearer_auth(access_token).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(YoutubeError::upstream(format!(
                "channel fetch failed ({status}): {body}"
            )));
        }

        let list: ChannelListResponse = response
            .json()
            .await
            .map_err(|e| YoutubeError::invalid_response(format!("channel response: {e}")))?;

        let item = list
            .items
            .into_iter()
            .next()
            .ok_or_else(|| YoutubeError::invalid_response("no channel for this account"))?;

        let stats = item.statistics.unwrap_or_default();
        Ok(ChannelInfo {
            id: item.id,
            title: item.snippet.title,
            handle: item.snippet.custom_url,
            thumbnail_url: item
                .snippet
                .thumbnails
                .and_then(|t| t.default)
                .map(|t| t.url),
            subscriber_count: parse_count(stats.subscriber_count),
            view_count: parse_count(stats.view_count),
            video_count: parse_count(stats.video_count),
        })
    }
}

fn parse_count(value: Option<String>) -> u64 {
    value.and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn channel_body() -> serde_json::Value {
        serde_json::json!({
            "items": [{
                "id": "UC123",
                "snippet": {
                    "title": "My Channel",
                    "customUrl": "@mychannel",
                    "thumbnails": { "default": { "url": "https://img.example/ch.png" } }
                },
                "statistics": {
                    "subscriberCount": "1234",
                    "viewCount": "56789",
                    "videoCount": "42"
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_fetch_mine_parses_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(header("authorization", "Bearer at-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(channel_body()))
            .mount(&server)
            .await;

        let client = ChannelClient::with_base_url(server.uri()).unwrap();
        let info = client.fetch_mine("at-1").await.unwrap();
        assert_eq!(info.id, "UC123");
        assert_eq!(info.handle.as_deref(), Some("@mychannel"));
        assert_eq!(info.subscriber_count, 1234);
        assert_eq!(info.view_count, 56789);
        assert_eq!(info.video_count, 42);
    }

    #[tokio::test]
    async fn test_fetch_mine_empty_items_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&server)
            .await;

        let client = ChannelClient::with_base_url(server.uri()).unwrap();
        let err = client.fetch_mine("at").await.unwrap_err();
        assert!(matches!(err, YoutubeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_mine_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = ChannelClient::with_base_url(server.uri()).unwrap();
        let err = client.fetch_mine("at").await.unwrap_err();
        assert!(matches!(err, YoutubeError::Upstream(_)));
    }
}
