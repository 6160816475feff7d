//! Document store backends.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreResult;

/// A named-document key-value store with load/save semantics.
///
/// The backend only moves bytes; document layout and locking are the
/// responsibility of the stores layered on top.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load a document by name. `None` when the document does not exist.
    async fn load(&self, name: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Save a document, replacing any existing content.
    async fn save(&self, name: &str, bytes: &[u8]) -> StoreResult<()>;
}

/// File-backed store: one `<name>.json` per document under a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, name: &str, bytes: &[u8]) -> StoreResult<()> {
        // Write-then-rename so a crash mid-write cannot truncate the document.
        let path = self.path_for(name);
        let tmp = self.dir.join(format!(".{name}.json.tmp"));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(document = name, bytes = bytes.len(), "Saved document");
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.docs.read().await.get(name).cloned())
    }

    async fn save(&self, name: &str, bytes: &[u8]) -> StoreResult<()> {
        self.docs
            .write()
            .await
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
