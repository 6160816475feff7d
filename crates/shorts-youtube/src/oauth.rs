//! Identity-provider OAuth client.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{YoutubeError, YoutubeResult};

const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested at authorization time.
const SCOPES: &str = "https://www.googleapis.com/auth/youtube.upload \
                      https://www.googleapis.com/auth/youtube.readonly";

/// Successful token-endpoint response.
///
/// `refresh_token` is only present on the initial code exchange; refresh
/// responses return a new access token and expiry only.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Error payload returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenErrorResponse {
    fn message(&self) -> String {
        match &self.error_description {
            Some(desc) => format!("{}: {}", self.error, desc),
            None => self.error.clone(),
        }
    }
}

/// Client for the identity provider's authorization and token endpoints.
pub struct OAuthClient {
    http: Client,
    auth_url: String,
    token_url: String,
}

impl OAuthClient {
    /// Create a client against the Google OAuth endpoints.
    pub fn new() -> YoutubeResult<Self> {
        Self::with_endpoints(DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL)
    }

    /// Create a client against custom endpoints (tests point this at a
    /// local mock server).
    pub fn with_endpoints(
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> YoutubeResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            auth_url: auth_url.into(),
            token_url: token_url.into(),
        })
    }

    /// Build the authorization redirect URL.
    ///
    /// `access_type=offline` plus `prompt=consent` so the provider issues a
    /// refresh token on every explicit re-authorization.
    pub fn authorize_url(&self, client_id: &str, redirect_uri: &str) -> YoutubeResult<String> {
        let mut url = Url::parse(&self.auth_url)
            .map_err(|e| YoutubeError::NotConfigured(format!("bad auth endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url.into())
    }

    /// Exchange an authorization code for a token pair.
    pub async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> YoutubeResult<TokenResponse> {
        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self.http.post(&self.token_url).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let message = token_error_message(response).await;
            return Err(YoutubeError::upstream(format!(
                "code exchange failed ({status}): {message}"
            )));
        }

        debug!("Exchanged authorization code for tokens");
        response
            .json()
            .await
            .map_err(|e| YoutubeError::invalid_response(format!("token response: {e}")))
    }

    /// Refresh an access token. The provider never returns a refresh token
    /// here; callers must keep the stored one.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> YoutubeResult<TokenResponse> {
        let params = [
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "refresh_token"),
        ];

        let response = self.http.post(&self.token_url).form(&params).send().await?;
        if !response.status().is_success() {
            let message = token_error_message(response).await;
            return Err(YoutubeError::RefreshFailed(message));
        }

        response
            .json()
            .await
            .map_err(|e| YoutubeError::invalid_response(format!("refresh response: {e}")))
    }
}

async fn token_error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<TokenErrorResponse>(&body) {
        Ok(err) => err.message(),
        Err(_) if !body.is_empty() => body,
        Err(_) => "no error detail".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_authorize_url_carries_offline_consent() {
        let client = OAuthClient::new().unwrap();
        let url = client
            .authorize_url("my-client", "http://localhost:8000/api/auth/callback")
            .unwrap();
        assert!(url.starts_with(DEFAULT_AUTH_URL));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
    }

    #[tokio::test]
    async fn test_exchange_code_parses_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at-1",
                "refresh_token": "rt-1",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let client =
            OAuthClient::with_endpoints(DEFAULT_AUTH_URL, format!("{}/token", server.uri()))
                .unwrap();
        let tokens = client
            .exchange_code("code", "id", "secret", "http://localhost/cb")
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "at-1");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt-1"));
        assert_eq!(tokens.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_refresh_error_payload_becomes_refresh_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Token has been revoked."
            })))
            .mount(&server)
            .await;

        let client =
            OAuthClient::with_endpoints(DEFAULT_AUTH_URL, format!("{}/token", server.uri()))
                .unwrap();
        let err = client.refresh("rt", "id", "secret").await.unwrap_err();
        match err {
            YoutubeError::RefreshFailed(msg) => {
                assert!(msg.contains("invalid_grant"));
                assert!(msg.contains("revoked"));
            }
            other => panic!("expected RefreshFailed, got {other:?}"),
        }
    }
}
