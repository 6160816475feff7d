//! The shared application state document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use shorts_models::{ChannelInfo, DraftId, TokenRecord, VideoDraft};

use crate::backend::DocumentStore;
use crate::error::StoreResult;

/// Bounded retention for the draft list: most-recent N, oldest evicted.
pub const MAX_DRAFTS: usize = 50;

const STATE_DOC: &str = "state";

/// Layout of the persisted state document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub videos: Vec<VideoDraft>,
    #[serde(default)]
    pub tokens: Option<TokenRecord>,
    #[serde(default)]
    pub channel: Option<ChannelInfo>,
}

/// Single-writer store over the state document.
///
/// Every mutating operation runs under one lock and persists the whole
/// document before returning, so concurrent requests cannot interleave
/// read-modify-write cycles and lose updates.
pub struct StateStore {
    backend: Arc<dyn DocumentStore>,
    doc: Mutex<StateDocument>,
}

impl StateStore {
    /// Open the store, loading the persisted document if one exists.
    pub async fn open(backend: Arc<dyn DocumentStore>) -> StoreResult<Self> {
        let doc = match backend.load(STATE_DOC).await? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => StateDocument::default(),
        };
        Ok(Self {
            backend,
            doc: Mutex::new(doc),
        })
    }

    async fn persist(&self, doc: &StateDocument) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        self.backend.save(STATE_DOC, &bytes).await
    }

    /// Round-trip the backend to verify it is still reachable. Used by
    /// readiness probes; a missing document is fine, an unreadable one
    /// is not.
    pub async fn ping(&self) -> StoreResult<()> {
        self.backend.load(STATE_DOC).await.map(|_| ())
    }

    // ------------------------------------------------------------------
    // Drafts
    // ------------------------------------------------------------------

    /// Insert a draft at the front of the list, evicting the oldest entries
    /// beyond [`MAX_DRAFTS`]. Returns the stored draft (the id may have been
    /// bumped to stay unique).
    pub async fn insert_draft(&self, mut draft: VideoDraft) -> StoreResult<VideoDraft> {
        let mut doc = self.doc.lock().await;

        // Timestamp-derived ids can collide when two drafts land in the same
        // millisecond; bump until unique.
        while doc.videos.iter().any(|d| d.id == draft.id) {
            let bumped = draft
                .id
                .as_str()
                .parse::<i64>()
                .map(|n| (n + 1).to_string())
                .unwrap_or_else(|_| format!("{}-1", draft.id));
            draft.id = DraftId::from_string(bumped);
        }

        doc.videos.insert(0, draft.clone());
        if doc.videos.len() > MAX_DRAFTS {
            doc.videos.truncate(MAX_DRAFTS);
        }

        self.persist(&doc).await?;
        info!(draft_id = %draft.id, topic = %draft.topic, "Stored new draft");
        Ok(draft)
    }

    /// List drafts, newest first.
    pub async fn list_drafts(&self) -> Vec<VideoDraft> {
        self.doc.lock().await.videos.clone()
    }

    /// Look up a draft by id.
    pub async fn get_draft(&self, id: &DraftId) -> Option<VideoDraft> {
        self.doc
            .lock()
            .await
            .videos
            .iter()
            .find(|d| &d.id == id)
            .cloned()
    }

    /// Delete a draft by id. Deleting a missing id is not an error;
    /// returns whether anything was removed.
    pub async fn delete_draft(&self, id: &DraftId) -> StoreResult<bool> {
        let mut doc = self.doc.lock().await;
        let before = doc.videos.len();
        doc.videos.retain(|d| &d.id != id);
        let removed = doc.videos.len() != before;
        if removed {
            self.persist(&doc).await?;
        }
        Ok(removed)
    }

    /// Replace a stored draft by id. Returns false if the id is unknown.
    pub async fn update_draft(&self, draft: &VideoDraft) -> StoreResult<bool> {
        let mut doc = self.doc.lock().await;
        match doc.videos.iter_mut().find(|d| d.id == draft.id) {
            Some(slot) => {
                *slot = draft.clone();
                self.persist(&doc).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Current token record, if connected.
    pub async fn token_record(&self) -> Option<TokenRecord> {
        self.doc.lock().await.tokens.clone()
    }

    /// Install a brand-new token record (code exchange / re-authorization).
    pub async fn set_token_record(&self, record: TokenRecord) -> StoreResult<()> {
        let mut doc = self.doc.lock().await;
        doc.tokens = Some(record);
        self.persist(&doc).await
    }

    /// Replace the access token and expiry together after a refresh,
    /// leaving the refresh token untouched. Returns false when no token
    /// record exists.
    pub async fn rotate_access_token(
        &self,
        access_token: &str,
        expires_in_secs: i64,
    ) -> StoreResult<bool> {
        let mut doc = self.doc.lock().await;
        match doc.tokens.as_mut() {
            Some(record) => {
                record.rotate_access(access_token, expires_in_secs);
                self.persist(&doc).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clear the token record and channel snapshot. Idempotent.
    pub async fn clear_connection(&self) -> StoreResult<()> {
        let mut doc = self.doc.lock().await;
        doc.tokens = None;
        doc.channel = None;
        self.persist(&doc).await
    }

    // ------------------------------------------------------------------
    // Channel
    // ------------------------------------------------------------------

    /// Cached channel snapshot.
    pub async fn channel(&self) -> Option<ChannelInfo> {
        self.doc.lock().await.channel.clone()
    }

    /// Replace the cached channel snapshot.
    pub async fn set_channel(&self, info: ChannelInfo) -> StoreResult<()> {
        let mut doc = self.doc.lock().await;
        doc.channel = Some(info);
        self.persist(&doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use shorts_models::DraftStatus;

    async fn memory_store() -> StateStore {
        StateStore::open(Arc::new(MemoryStore::new())).await.unwrap()
    }

    fn draft(topic: &str) -> VideoDraft {
        VideoDraft::new(topic, "Engaging", 60, "Title", "Hook", "Script body", "#tag")
    }

    #[tokio::test]
    async fn test_insert_prepends() {
        let store = memory_store().await;
        store.insert_draft(draft("first")).await.unwrap();
        store.insert_draft(draft("second")).await.unwrap();

        let drafts = store.list_drafts().await;
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].topic, "second");
        assert_eq!(drafts[1].topic, "first");
    }

    #[tokio::test]
    async fn test_insert_bumps_colliding_ids() {
        let store = memory_store().await;
        let a = draft("a");
        let mut b = draft("b");
        b.id = a.id.clone();

        let a = store.insert_draft(a).await.unwrap();
        let b = store.insert_draft(b).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_retention_evicts_exactly_the_oldest() {
        let store = memory_store().await;
        let oldest = store.insert_draft(draft("topic-0")).await.unwrap();
        for i in 1..=MAX_DRAFTS {
            store.insert_draft(draft(&format!("topic-{i}"))).await.unwrap();
        }

        let drafts = store.list_drafts().await;
        assert_eq!(drafts.len(), MAX_DRAFTS);
        assert!(store.get_draft(&oldest.id).await.is_none());
        assert_eq!(drafts.last().unwrap().topic, "topic-1");
        assert_eq!(drafts[0].topic, format!("topic-{MAX_DRAFTS}"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = memory_store().await;
        let d = store.insert_draft(draft("x")).await.unwrap();

        assert!(store.delete_draft(&d.id).await.unwrap());
        assert!(!store.delete_draft(&d.id).await.unwrap());
        assert!(!store.delete_draft(&DraftId::from("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let store = memory_store().await;
        let d = store.insert_draft(draft("x")).await.unwrap();

        let updated = d.clone().fail("boom");
        assert!(store.update_draft(&updated).await.unwrap());

        let stored = store.get_draft(&d.id).await.unwrap();
        assert_eq!(stored.status, DraftStatus::Error);
        assert_eq!(stored.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_false() {
        let store = memory_store().await;
        assert!(!store.update_draft(&draft("x")).await.unwrap());
    }

    #[tokio::test]
    async fn test_rotate_access_token_without_record() {
        let store = memory_store().await;
        assert!(!store.rotate_access_token("at", 3600).await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_connection_is_idempotent() {
        let store = memory_store().await;
        store
            .set_token_record(TokenRecord::new("at", "rt", 3600))
            .await
            .unwrap();
        store.clear_connection().await.unwrap();
        store.clear_connection().await.unwrap();
        assert!(store.token_record().await.is_none());
        assert!(store.channel().await.is_none());
    }

    #[tokio::test]
    async fn test_ping_reports_unreadable_backend() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open(Arc::new(
            crate::backend::JsonFileStore::new(dir.path()).await.unwrap(),
        ))
        .await
        .unwrap();
        assert!(store.ping().await.is_ok());

        // A directory squatting on the document path makes reads fail.
        tokio::fs::create_dir(dir.path().join("state.json"))
            .await
            .unwrap();
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let backend = Arc::new(MemoryStore::new());
        let store = StateStore::open(Arc::clone(&backend) as Arc<dyn DocumentStore>)
            .await
            .unwrap();
        let d = store.insert_draft(draft("persisted")).await.unwrap();
        store
            .set_token_record(TokenRecord::new("at", "rt", 3600))
            .await
            .unwrap();

        let reopened = StateStore::open(backend).await.unwrap();
        assert!(reopened.get_draft(&d.id).await.is_some());
        assert_eq!(
            reopened.token_record().await.unwrap().refresh_token,
            "rt"
        );
    }
}
