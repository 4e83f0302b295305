use thiserror::Error;

use crate::user::errors::UserError;

/// Error type for authentication operations.
///
/// `InvalidCredentials` covers every caller-attributable authentication
/// failure: unknown username, wrong password, and wrong current password on
/// a password change. Callers cannot tell these apart. Store and hashing
/// failures stay distinct so they surface as internal errors rather than
/// authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("new password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::TokenError),

    #[error(transparent)]
    Repository(#[from] UserError),
}
