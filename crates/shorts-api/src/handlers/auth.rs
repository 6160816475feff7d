//! Credential setup and OAuth flow handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use shorts_models::{ChannelInfo, Credentials};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Backend status summary.
#[derive(Serialize)]
pub struct StatusResponse {
    /// OAuth client id/secret present
    pub oauth_configured: bool,
    /// External generation key present
    pub generation_configured: bool,
    /// Token record present
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelInfo>,
}

/// Status check.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let creds = state.credentials.get().await;
    Json(StatusResponse {
        oauth_configured: creds.has_oauth_client(),
        generation_configured: creds.has_generation_key(),
        connected: state.tokens.is_connected().await,
        channel: state.store.channel().await,
    })
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub generation_api_key: Option<String>,
}

#[derive(Serialize)]
pub struct CredentialsResponse {
    pub updated: bool,
    pub oauth_configured: bool,
    pub generation_configured: bool,
}

/// Store operator credentials. Provided fields overwrite the stored ones;
/// omitted fields are left as they are (credentials are never deleted).
pub async fn set_credentials(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<Json<CredentialsResponse>> {
    let current = state.credentials.get().await;
    let merged = Credentials {
        client_id: non_blank(req.client_id).or(current.client_id),
        client_secret: non_blank(req.client_secret).or(current.client_secret),
        generation_api_key: non_blank(req.generation_api_key).or(current.generation_api_key),
    };
    state.credentials.set(merged.clone()).await?;

    Ok(Json(CredentialsResponse {
        updated: true,
        oauth_configured: merged.has_oauth_client(),
        generation_configured: merged.has_generation_key(),
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

/// Build the OAuth authorization URL.
pub async fn auth_url(State(state): State<AppState>) -> ApiResult<Json<AuthUrlResponse>> {
    let url = state.tokens.authorize_url().await?;
    Ok(Json(AuthUrlResponse { url }))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ConnectResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelInfo>,
}

/// OAuth callback: exchange the authorization code for a token record.
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Json<ConnectResponse>> {
    if let Some(error) = query.error {
        return Err(ApiError::bad_request(format!(
            "Authorization denied by provider: {error}"
        )));
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::validation("Missing authorization code"))?;

    state.tokens.connect(&code).await?;
    info!("OAuth connect completed");

    Ok(Json(ConnectResponse {
        connected: true,
        channel: state.store.channel().await,
    }))
}

#[derive(Serialize)]
pub struct DisconnectResponse {
    pub disconnected: bool,
}

/// Drop the stored token record and channel snapshot.
pub async fn disconnect(State(state): State<AppState>) -> ApiResult<Json<DisconnectResponse>> {
    state.tokens.disconnect().await?;
    Ok(Json(DisconnectResponse { disconnected: true }))
}
