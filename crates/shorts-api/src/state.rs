//! Application state.

use std::sync::Arc;

use shorts_store::{CredentialStore, DocumentStore, JsonFileStore, StateStore};
use shorts_youtube::{ChannelClient, OAuthClient, TokenManager};

use crate::config::ApiConfig;
use crate::services::{Scheduler, ScriptGenerator};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<StateStore>,
    pub credentials: Arc<CredentialStore>,
    pub tokens: Arc<TokenManager>,
    pub generator: Arc<ScriptGenerator>,
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    /// Create new application state with file-backed persistence.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let backend: Arc<dyn DocumentStore> =
            Arc::new(JsonFileStore::new(&config.data_dir).await?);

        let store = Arc::new(StateStore::open(Arc::clone(&backend)).await?);
        let credentials = Arc::new(CredentialStore::open(backend).await?);

        let tokens = Arc::new(TokenManager::new(
            Arc::clone(&store),
            Arc::clone(&credentials),
            OAuthClient::new()?,
            ChannelClient::new()?,
            config.redirect_uri(),
        ));

        let generator = Arc::new(ScriptGenerator::new(
            Arc::clone(&credentials),
            config.generation_base_url.clone(),
            config.generation_model.clone(),
        )?);

        let scheduler = Arc::new(Scheduler::new(Arc::clone(&store), Arc::clone(&tokens)));

        Ok(Self {
            config,
            store,
            credentials,
            tokens,
            generator,
            scheduler,
        })
    }
}
