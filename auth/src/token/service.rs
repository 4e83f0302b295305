use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Issuer label stamped into every claim.
const ISSUER: &str = "account-service";

/// Issues and validates signed identity tokens.
///
/// Tokens are compact HS256 JWTs signed with a single process-wide secret;
/// they are self-contained and never persisted server-side. Construct one
/// instance at startup and share it behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validity: Duration,
}

impl TokenService {
    /// Create a new token service.
    ///
    /// # Arguments
    /// * `secret` - Signing secret (should be at least 32 bytes for HS256;
    ///   supplied by configuration, never derived from user input)
    /// * `validity_hours` - Hours between issuance and expiry
    pub fn new(secret: &[u8], validity_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            validity: Duration::hours(validity_hours),
        }
    }

    /// Issue a token for an authenticated user.
    ///
    /// Builds claims with `iat` = now and `exp` = now + the configured
    /// validity window, then signs header and claims with the secret.
    ///
    /// # Arguments
    /// * `user_id` - Account identifier
    /// * `username` - Username at issuance time
    ///
    /// # Returns
    /// Compact token string
    ///
    /// # Errors
    /// * `SigningFailed` - Claim serialization or signing failed
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, username, ISSUER, self.validity);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Validate a token and return its claims.
    ///
    /// Recomputes the signature over header and claims with the secret and
    /// compares in constant time; rejects tokens whose header declares a
    /// different algorithm, whose structure is malformed, or whose expiry
    /// has passed (no leeway).
    ///
    /// # Arguments
    /// * `token` - Compact token string
    ///
    /// # Returns
    /// The verified claims
    ///
    /// # Errors
    /// * `Invalid` - Any validation failure. The variant is deliberately
    ///   opaque: expired and forged tokens are indistinguishable to callers.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_issue_and_validate() {
        let tokens = TokenService::new(SECRET, 24);

        let token = tokens.issue(42, "alice").expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let claims = tokens.validate(&token).expect("Failed to validate token");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let issuing = TokenService::new(b"secret1_at_least_32_bytes_long_key!", 24);
        let validating = TokenService::new(b"secret2_at_least_32_bytes_long_key!", 24);

        let token = issuing.issue(42, "alice").expect("Failed to issue token");

        assert!(matches!(
            validating.validate(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_validate_expired_token() {
        // Negative validity puts `exp` in the past at issuance time
        let issuing = TokenService::new(SECRET, -2);
        let validating = TokenService::new(SECRET, 24);

        let token = issuing.issue(42, "alice").expect("Failed to issue token");

        assert!(matches!(
            validating.validate(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_validate_tampered_token() {
        let tokens = TokenService::new(SECRET, 24);
        let token = tokens.issue(42, "alice").expect("Failed to issue token");

        // Corrupt one byte in each of the three segments in turn
        for segment in 0..3 {
            let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
            let target = &mut parts[segment];
            let original = target.remove(0);
            let replacement = if original == 'A' { 'B' } else { 'A' };
            target.insert(0, replacement);
            let tampered = parts.join(".");

            assert!(
                matches!(tokens.validate(&tampered), Err(TokenError::Invalid)),
                "tampered segment {segment} was accepted"
            );
        }
    }

    #[test]
    fn test_validate_malformed_token() {
        let tokens = TokenService::new(SECRET, 24);

        for garbage in ["", "garbage", "a.b", "a.b.c", "a.b.c.d"] {
            assert!(
                matches!(tokens.validate(garbage), Err(TokenError::Invalid)),
                "malformed token {garbage:?} was accepted"
            );
        }
    }

    #[test]
    fn test_invalid_error_is_opaque() {
        let tokens = TokenService::new(SECRET, 24);
        let expired = TokenService::new(SECRET, -2)
            .issue(42, "alice")
            .expect("Failed to issue token");

        let expired_err = tokens.validate(&expired).unwrap_err();
        let forged_err = tokens.validate("a.b.c").unwrap_err();

        // Expired and forged tokens must surface identically
        assert_eq!(expired_err.to_string(), forged_err.to_string());
    }
}
