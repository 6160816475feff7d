//! YouTube client error types.

use thiserror::Error;

/// Result type for YouTube operations.
pub type YoutubeResult<T> = Result<T, YoutubeError>;

/// Errors that can occur while talking to the identity provider or the
/// platform API.
#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("Not authenticated with YouTube")]
    NotAuthenticated,

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Token refresh rejected: {0}")]
    RefreshFailed(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(#[from] shorts_store::StoreError),
}

impl YoutubeError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
