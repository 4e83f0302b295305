//! Authentication core library
//!
//! Provides the credential and token primitives for the account service:
//! - Password hashing (Argon2id)
//! - Signed identity-token issuance and validation
//!
//! The library owns no I/O and no store access. The service crate composes
//! these primitives with its user store to implement login, password change,
//! and request authorization.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &digest));
//! assert!(!hasher.verify("not_my_password", &digest));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenService;
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!", 24);
//! let token = tokens.issue(42, "alice").unwrap();
//! let claims = tokens.validate(&token).unwrap();
//! assert_eq!(claims.user_id, 42);
//! assert_eq!(claims.username, "alice");
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::TokenError;
pub use token::TokenService;
