//! Session credential types

use chrono::{DateTime, Utc};
use murmur_domain::types::auth::TokenPair;
use serde::{Deserialize, Serialize};

/// Access and refresh tokens with the access token's absolute expiry
///
/// The access token authorizes requests; the refresh token is exchanged for
/// a fresh pair when the access token expires. Instances are immutable:
/// a refresh produces a new value rather than mutating the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCredentials {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token, when the backend reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionCredentials {
    /// Build credentials from a freshly issued token pair
    ///
    /// `expires_at` is computed from the pair's `expires_in` lifetime.
    pub fn from_token_pair(pair: &TokenPair) -> Self {
        let expires_at = (pair.expires_in > 0)
            .then(|| Utc::now() + chrono::Duration::seconds(pair.expires_in));

        Self {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            expires_at,
        }
    }

    /// Check whether the access token is expired or expires within the
    /// given threshold
    ///
    /// Returns `false` when the backend reported no expiry.
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at,
            None => false,
        }
    }
}
