use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;

/// Port for authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify credentials and issue an identity token.
    ///
    /// # Arguments
    /// * `username` - Claimed username
    /// * `password` - Plaintext password to verify
    ///
    /// # Returns
    /// Signed token string
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    ///   (indistinguishable by design)
    /// * `Repository` - Store lookup failed
    /// * `Token` - Token issuance failed
    async fn login(&self, username: &str, password: &str) -> Result<String, AuthError>;

    /// Change a user's password after re-verifying the current one.
    ///
    /// Previously issued tokens stay valid until their natural expiry;
    /// tokens are stateless and carry no revocation handle.
    ///
    /// # Arguments
    /// * `user_id` - Account identifier (from the verified request identity)
    /// * `current_password` - Must verify against the stored hash
    /// * `new_password` - Replacement credential, at least 8 characters
    ///
    /// # Errors
    /// * `InvalidCredentials` - Current password does not verify
    /// * `WeakPassword` - New password is shorter than 8 characters
    /// * `Password` - Hashing the new password failed
    /// * `Repository` - Store lookup or update failed
    async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
