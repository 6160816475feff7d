//! OAuth token record.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Refresh margin in seconds: a token is treated as stale this long before
/// its actual expiry, so it cannot expire while a request is in flight.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Persisted OAuth token state.
///
/// `refresh_token` is set once at first authorization and only replaced by
/// an explicit re-authorization; `access_token` and `expiry` are always
/// replaced together on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub expiry: DateTime<Utc>,
}

impl TokenRecord {
    /// Create a record from a token-endpoint response.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in_secs: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expiry: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    /// True if the access token is still usable at `now`, with the refresh
    /// margin applied.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry - Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)
    }

    /// True if the access token is still usable right now.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    /// Replace the access token and expiry together after a refresh.
    /// The refresh token is deliberately left untouched.
    pub fn rotate_access(&mut self, access_token: impl Into<String>, expires_in_secs: i64) {
        self.access_token = access_token.into();
        self.expiry = Utc::now() + Duration::seconds(expires_in_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_inside_margin_window() {
        let record = TokenRecord::new("at", "rt", 3600);
        assert!(record.is_fresh());
    }

    #[test]
    fn test_stale_within_refresh_margin() {
        // Expires in 30s, inside the 60s margin
        let record = TokenRecord::new("at", "rt", 30);
        assert!(!record.is_fresh());
    }

    #[test]
    fn test_stale_after_expiry() {
        let record = TokenRecord::new("at", "rt", -10);
        assert!(!record.is_fresh());
    }

    #[test]
    fn test_rotate_access_preserves_refresh_token() {
        let mut record = TokenRecord::new("old", "rt", 10);
        let old_expiry = record.expiry;
        record.rotate_access("new", 3600);
        assert_eq!(record.access_token, "new");
        assert_eq!(record.refresh_token, "rt");
        assert!(record.expiry > old_expiry);
    }
}
