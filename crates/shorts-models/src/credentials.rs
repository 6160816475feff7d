//! Operator credentials.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// OAuth client credentials plus the generation API key.
///
/// All fields are optional; they are set by an explicit setup call and only
/// ever overwritten, never deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_api_key: Option<String>,
}

impl Credentials {
    /// True when the OAuth client pair is configured.
    pub fn has_oauth_client(&self) -> bool {
        self.client_id.as_deref().is_some_and(|s| !s.is_empty())
            && self.client_secret.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// True when an external generation key is configured.
    pub fn has_generation_key(&self) -> bool {
        self.generation_api_key
            .as_deref()
            .is_some_and(|s| !s.is_empty())
    }
}
