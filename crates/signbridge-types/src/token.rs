//! OAuth token state for the e-signature provider.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Safety margin applied before `expires_at` when deciding freshness.
pub const FRESHNESS_BUFFER_SECS: i64 = 30;

/// Cached OAuth credentials, persisted as a whole document on every mutation.
///
/// Field names match the on-disk `tokens.json` layout; `expires_at` is stored
/// as epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenState {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default, with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl OAuthTokenState {
    /// True when an access token is cached and `now` is more than the
    /// freshness buffer away from expiry.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty()
            && expiry_after(now, FRESHNESS_BUFFER_SECS).is_some_and(|t| t < self.expires_at)
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Apply a new access token. The refresh token is only replaced when one
    /// is supplied.
    pub fn apply(
        &mut self,
        access_token: String,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
    ) {
        self.access_token = access_token;
        self.expires_at = expires_at;
        if let Some(refresh) = refresh_token.filter(|r| !r.is_empty()) {
            self.refresh_token = refresh;
        }
    }
}

/// `now + ttl_secs`, or `None` when the result is outside chrono's range.
pub fn expiry_after(now: DateTime<Utc>, ttl_secs: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(ttl_secs).and_then(|ttl| now.checked_add_signed(ttl))
}

/// Token endpoint response for both the authorization-code and refresh grants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
