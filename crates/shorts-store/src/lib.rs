//! Document persistence for the Shorts Studio backend.
//!
//! This crate provides:
//! - A small async document-store abstraction with file and in-memory backends
//! - `StateStore`: the single shared app document (drafts, tokens, channel)
//!   behind a single-writer lock
//! - `CredentialStore`: the operator credentials document

pub mod backend;
pub mod credentials;
pub mod error;
pub mod state;

pub use backend::{DocumentStore, JsonFileStore, MemoryStore};
pub use credentials::CredentialStore;
pub use error::{StoreError, StoreResult};
pub use state::{StateDocument, StateStore, MAX_DRAFTS};
