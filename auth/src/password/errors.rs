use thiserror::Error;

/// Error type for password operations.
///
/// Verification is infallible by contract (a digest that cannot be parsed is
/// simply not a match), so only hashing itself can fail.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
