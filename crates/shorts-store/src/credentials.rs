//! Operator credentials document.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use shorts_models::Credentials;

use crate::backend::DocumentStore;
use crate::error::StoreResult;

const CREDENTIALS_DOC: &str = "credentials";

/// Single-writer store over the credentials document.
pub struct CredentialStore {
    backend: Arc<dyn DocumentStore>,
    doc: Mutex<Credentials>,
}

impl CredentialStore {
    /// Open the store, loading persisted credentials if present.
    pub async fn open(backend: Arc<dyn DocumentStore>) -> StoreResult<Self> {
        let doc = match backend.load(CREDENTIALS_DOC).await? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => Credentials::default(),
        };
        Ok(Self {
            backend,
            doc: Mutex::new(doc),
        })
    }

    /// Current credentials.
    pub async fn get(&self) -> Credentials {
        self.doc.lock().await.clone()
    }

    /// Overwrite the stored credentials. Fields are only ever replaced by
    /// an explicit setup call, never cleared implicitly.
    pub async fn set(&self, credentials: Credentials) -> StoreResult<()> {
        let mut doc = self.doc.lock().await;
        *doc = credentials;
        let bytes = serde_json::to_vec_pretty(&*doc)?;
        self.backend.save(CREDENTIALS_DOC, &bytes).await?;
        info!("Updated operator credentials");
        Ok(())
    }
}
