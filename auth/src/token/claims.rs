use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity payload embedded in every issued token.
///
/// Claims are immutable once issued; the only bound on their validity is
/// `exp` (there is no revocation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Account identifier of the authenticated user
    pub user_id: i64,

    /// Username at issuance time
    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer label
    pub iss: String,
}

impl Claims {
    /// Create claims for a freshly authenticated user.
    ///
    /// # Arguments
    /// * `user_id` - Account identifier
    /// * `username` - Username at issuance time
    /// * `issuer` - Issuer label
    /// * `validity` - Window between issued-at and expiry
    ///
    /// # Returns
    /// Claims with `iat` = now and `exp` = now + `validity`
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        issuer: impl Into<String>,
        validity: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            username: username.into(),
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
            iss: issuer.into(),
        }
    }
}
