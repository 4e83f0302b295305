use thiserror::Error;

/// Error type for token operations.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// The token failed validation: bad signature, unexpected algorithm,
    /// malformed structure, or past expiry. Deliberately carries no detail
    /// about which check failed, so callers cannot distinguish an expired
    /// token from a forged one.
    #[error("invalid token")]
    Invalid,

    #[error("failed to sign token: {0}")]
    SigningFailed(String),
}
