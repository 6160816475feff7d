//! YouTube OAuth token lifecycle and channel client.
//!
//! This crate provides:
//! - `OAuthClient`: authorization URL construction, code exchange and
//!   token refresh against the identity provider
//! - `TokenManager`: the token lifecycle owner; hands out non-expired
//!   access tokens, refreshing transparently on demand
//! - `ChannelClient`: read-only channel profile/statistics fetch

pub mod channel;
pub mod error;
pub mod oauth;
pub mod token_manager;

pub use channel::ChannelClient;
pub use error::{YoutubeError, YoutubeResult};
pub use oauth::{OAuthClient, TokenResponse};
pub use token_manager::TokenManager;
