//! Script generation output contract.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A generated script bundle.
///
/// Shared output shape of the external generation path and the local
/// fallback generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptArtifact {
    pub title: String,
    pub hook: String,
    pub script: String,
    /// Space-separated hashtags, each prefixed with `#`
    pub hashtags: String,
}
