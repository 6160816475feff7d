//! OAuth token lifecycle manager.
//!
//! Owns the persisted token record and provides:
//! - Refresh margin so a token cannot expire mid-request
//! - Single-flight refresh to prevent concurrent requests racing the
//!   token endpoint
//! - Failed refreshes leave the stored record untouched, so a later
//!   retry or manual re-authorization can still proceed

use std::sync::Arc;

use metrics::counter;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use shorts_models::TokenRecord;
use shorts_store::{CredentialStore, StateStore};

use crate::channel::ChannelClient;
use crate::error::{YoutubeError, YoutubeResult};
use crate::oauth::OAuthClient;

const TOKEN_REFRESH_METRIC: &str = "shorts_token_refresh_total";

/// Token lifecycle owner.
pub struct TokenManager {
    state: Arc<StateStore>,
    credentials: Arc<CredentialStore>,
    oauth: OAuthClient,
    channel: ChannelClient,
    redirect_uri: String,
    // Serializes the refresh path; read-only fast path skips it.
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        state: Arc<StateStore>,
        credentials: Arc<CredentialStore>,
        oauth: OAuthClient,
        channel: ChannelClient,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            state,
            credentials,
            oauth,
            channel,
            redirect_uri: redirect_uri.into(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// True when a token record is present.
    pub async fn is_connected(&self) -> bool {
        self.state.token_record().await.is_some()
    }

    /// Build the authorization URL for the OAuth consent screen.
    pub async fn authorize_url(&self) -> YoutubeResult<String> {
        let creds = self.credentials.get().await;
        let client_id = creds
            .client_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| YoutubeError::NotConfigured("OAuth client id not set".into()))?;
        self.oauth.authorize_url(&client_id, &self.redirect_uri)
    }

    /// Get a non-expired access token, refreshing transparently if needed.
    ///
    /// Fast path: the stored token is still inside the freshness window and
    /// is returned unchanged. Slow path: acquire the refresh lock, re-check
    /// (another request may have refreshed while we waited), then hit the
    /// token endpoint and atomically replace access token + expiry. A
    /// rejected refresh mutates nothing.
    pub async fn get_valid_token(&self) -> YoutubeResult<String> {
        let record = self
            .state
            .token_record()
            .await
            .ok_or(YoutubeError::NotAuthenticated)?;
        if record.is_fresh() {
            return Ok(record.access_token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Double-check: the refresh may already have happened.
        let record = self
            .state
            .token_record()
            .await
            .ok_or(YoutubeError::NotAuthenticated)?;
        if record.is_fresh() {
            return Ok(record.access_token);
        }

        self.refresh(&record).await
    }

    async fn refresh(&self, record: &TokenRecord) -> YoutubeResult<String> {
        let creds = self.credentials.get().await;
        let (client_id, client_secret) = match (creds.client_id, creds.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => (id, secret),
            _ => {
                return Err(YoutubeError::RefreshFailed(
                    "OAuth client credentials not configured".into(),
                ))
            }
        };

        debug!("Access token stale, refreshing");
        match self
            .oauth
            .refresh(&record.refresh_token, &client_id, &client_secret)
            .await
        {
            Ok(response) => {
                self.state
                    .rotate_access_token(&response.access_token, response.expires_in)
                    .await?;
                counter!(TOKEN_REFRESH_METRIC, "result" => "ok").increment(1);
                info!(expires_in = response.expires_in, "Refreshed access token");
                Ok(response.access_token)
            }
            Err(e) => {
                // Keep the last-known record so the operator can retry or
                // re-authorize.
                counter!(TOKEN_REFRESH_METRIC, "result" => "error").increment(1);
                warn!("Token refresh failed: {e}");
                Err(e)
            }
        }
    }

    /// Exchange an authorization code and install a brand-new token record,
    /// overwriting any prior one. Fetching channel info afterwards is
    /// best-effort; its failure does not fail the exchange.
    pub async fn connect(&self, code: &str) -> YoutubeResult<TokenRecord> {
        let creds = self.credentials.get().await;
        let (client_id, client_secret) = match (creds.client_id, creds.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => (id, secret),
            _ => {
                return Err(YoutubeError::NotConfigured(
                    "OAuth client credentials not set".into(),
                ))
            }
        };

        let response = self
            .oauth
            .exchange_code(code, &client_id, &client_secret, &self.redirect_uri)
            .await?;
        let refresh_token = response.refresh_token.ok_or_else(|| {
            YoutubeError::invalid_response("token response missing refresh_token")
        })?;

        let record = TokenRecord::new(response.access_token, refresh_token, response.expires_in);
        self.state.set_token_record(record.clone()).await?;
        info!("Connected YouTube account");

        match self.channel.fetch_mine(&record.access_token).await {
            Ok(info) => self.state.set_channel(info).await?,
            Err(e) => warn!("Channel info fetch after connect failed: {e}"),
        }

        Ok(record)
    }

    /// Drop the token record and channel snapshot. Idempotent.
    pub async fn disconnect(&self) -> YoutubeResult<()> {
        self.state.clear_connection().await?;
        info!("Disconnected YouTube account");
        Ok(())
    }

    /// Fetch a fresh channel snapshot and cache it.
    pub async fn refresh_channel(&self) -> YoutubeResult<shorts_models::ChannelInfo> {
        let token = self.get_valid_token().await?;
        let info = self.channel.fetch_mine(&token).await?;
        self.state.set_channel(info.clone()).await?;
        Ok(info)
    }
}
