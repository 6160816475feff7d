//! Draft scheduling state machine.
//!
//! Transitions a draft from `draft` to `scheduled` (or `error`), gated by
//! the token manager. Scheduling finalizes publish metadata and validates
//! authorization; it does not transmit any video content.

use std::sync::Arc;

use tracing::{info, warn};

use shorts_models::{DraftId, PublishMetadata, VideoDraft};
use shorts_store::StateStore;
use shorts_youtube::{TokenManager, YoutubeError};

use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Fixed publish defaults: "People & Blogs", not publicly visible until
/// the operator flips it on the platform.
const DEFAULT_CATEGORY_ID: &str = "22";
const DEFAULT_PRIVACY_STATUS: &str = "private";

/// Trailing marker appended to every description so the platform files the
/// upload as a Short.
const PLATFORM_MARKER_TAG: &str = "#Shorts";

pub struct Scheduler {
    state: Arc<StateStore>,
    tokens: Arc<TokenManager>,
}

impl Scheduler {
    pub fn new(state: Arc<StateStore>, tokens: Arc<TokenManager>) -> Self {
        Self { state, tokens }
    }

    /// Transition a draft to `scheduled`.
    ///
    /// On any token-acquisition failure the draft is moved to `error` with
    /// the failure message persisted on it, and the failure is re-raised.
    /// The draft is deliberately not rolled back to `draft`: a retry is an
    /// explicit new call on the same id, which proceeds from `error`
    /// exactly as it would from `draft`.
    pub async fn schedule(&self, id: &DraftId) -> ApiResult<VideoDraft> {
        let draft = self
            .state
            .get_draft(id)
            .await
            .ok_or_else(|| ApiError::not_found(format!("No draft with id {id}")))?;

        match self.tokens.get_valid_token().await {
            Ok(_token) => {
                let metadata = build_publish_metadata_for(&draft);
                let updated = draft.schedule(metadata);
                self.state.update_draft(&updated).await?;
                metrics::record_draft_scheduled();
                info!(draft_id = %updated.id, title = %updated.title, "Draft scheduled");
                Ok(updated)
            }
            Err(e) => {
                metrics::record_schedule_failure(failure_reason(&e));
                warn!(draft_id = %draft.id, "Scheduling failed: {e}");
                let failed = draft.fail(e.to_string());
                self.state.update_draft(&failed).await?;
                Err(e.into())
            }
        }
    }
}

fn failure_reason(e: &YoutubeError) -> &'static str {
    match e {
        YoutubeError::NotAuthenticated => "not_authenticated",
        YoutubeError::RefreshFailed(_) => "refresh_failed",
        _ => "upstream",
    }
}

/// Synthesize platform-ready metadata from the draft's own fields.
fn build_publish_metadata_for(draft: &VideoDraft) -> PublishMetadata {
    PublishMetadata {
        title: draft.title.clone(),
        description: format!(
            "{}\n\n{} {}",
            draft.script, draft.hashtags, PLATFORM_MARKER_TAG
        ),
        tags: parse_tags(&draft.hashtags),
        category_id: DEFAULT_CATEGORY_ID.to_string(),
        privacy_status: DEFAULT_PRIVACY_STATUS.to_string(),
    }
}

/// Split a hashtag string into bare tag tokens, dropping empty and
/// whitespace-only pieces.
pub fn parse_tags(hashtags: &str) -> Vec<String> {
    hashtags
        .split('#')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use shorts_models::{Credentials, DraftStatus, TokenRecord};
    use shorts_store::{CredentialStore, MemoryStore};
    use shorts_youtube::{ChannelClient, OAuthClient};

    struct Fixture {
        state: Arc<StateStore>,
        scheduler: Scheduler,
    }

    async fn fixture() -> Fixture {
        let state = Arc::new(
            StateStore::open(Arc::new(MemoryStore::new()))
                .await
                .unwrap(),
        );
        let credentials = Arc::new(
            CredentialStore::open(Arc::new(MemoryStore::new()))
                .await
                .unwrap(),
        );
        credentials
            .set(Credentials {
                client_id: Some("id".into()),
                client_secret: Some("secret".into()),
                generation_api_key: None,
            })
            .await
            .unwrap();

        let tokens = Arc::new(TokenManager::new(
            Arc::clone(&state),
            credentials,
            OAuthClient::new().unwrap(),
            ChannelClient::new().unwrap(),
            "http://localhost/cb",
        ));
        let scheduler = Scheduler::new(Arc::clone(&state), tokens);
        Fixture { state, scheduler }
    }

    fn draft() -> VideoDraft {
        VideoDraft::new(
            "cooking",
            "Engaging",
            60,
            "5 Cooking Tricks",
            "You are doing this wrong.",
            "Point one. Point two. Point three.",
            "#cooking #shorts #fyp",
        )
    }

    #[test]
    fn test_parse_tags_drops_empty_tokens() {
        assert_eq!(
            parse_tags("#cooking #shorts #fyp"),
            vec!["cooking", "shorts", "fyp"]
        );
        assert_eq!(parse_tags("# #  #solo"), vec!["solo"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_publish_metadata_description_layout() {
        let d = draft();
        let meta = build_publish_metadata_for(&d);
        assert_eq!(
            meta.description,
            "Point one. Point two. Point three.\n\n#cooking #shorts #fyp #Shorts"
        );
        assert_eq!(meta.title, d.title);
        assert_eq!(meta.category_id, "22");
        assert_eq!(meta.privacy_status, "private");
    }

    #[tokio::test]
    async fn test_schedule_unknown_id_is_not_found_and_mutates_nothing() {
        let fx = fixture().await;
        fx.state.insert_draft(draft()).await.unwrap();
        let before = fx.state.list_drafts().await;

        let err = fx
            .scheduler
            .schedule(&DraftId::from("does-not-exist"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let after = fx.state.list_drafts().await;
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0].status, after[0].status);
    }

    #[tokio::test]
    async fn test_schedule_with_valid_token_finalizes_metadata() {
        let fx = fixture().await;
        fx.state
            .set_token_record(TokenRecord::new("at", "rt", 3600))
            .await
            .unwrap();
        let d = fx.state.insert_draft(draft()).await.unwrap();

        let scheduled = fx.scheduler.schedule(&d.id).await.unwrap();
        assert_eq!(scheduled.status, DraftStatus::Scheduled);
        assert!(scheduled.scheduled_at.is_some());

        let meta = scheduled.publish_metadata.unwrap();
        assert!(meta.description.contains(&d.script));
        assert_eq!(meta.tags, vec!["cooking", "shorts", "fyp"]);

        // The mutation is persisted, not just returned.
        let stored = fx.state.get_draft(&d.id).await.unwrap();
        assert_eq!(stored.status, DraftStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_schedule_unauthenticated_lands_in_error_then_retry_succeeds() {
        let fx = fixture().await;
        let d = fx.state.insert_draft(draft()).await.unwrap();

        let err = fx.scheduler.schedule(&d.id).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let stored = fx.state.get_draft(&d.id).await.unwrap();
        assert_eq!(stored.status, DraftStatus::Error);
        assert!(!stored.error.as_deref().unwrap_or_default().is_empty());

        // Authenticate, then explicitly re-invoke on the same id.
        fx.state
            .set_token_record(TokenRecord::new("at", "rt", 3600))
            .await
            .unwrap();
        let scheduled = fx.scheduler.schedule(&d.id).await.unwrap();
        assert_eq!(scheduled.status, DraftStatus::Scheduled);
        assert!(scheduled.error.is_none());
    }
}
