//! Shared data models for the Shorts Studio backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video drafts and their scheduling lifecycle
//! - OAuth token records and credentials
//! - Cached channel metadata
//! - Script artifacts produced by generation

pub mod channel;
pub mod credentials;
pub mod draft;
pub mod script;
pub mod token;

// Re-export common types
pub use channel::ChannelInfo;
pub use credentials::Credentials;
pub use draft::{DraftId, DraftStatus, PublishMetadata, VideoDraft};
pub use script::ScriptArtifact;
pub use token::{TokenRecord, TOKEN_REFRESH_MARGIN_SECS};
