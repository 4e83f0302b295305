use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::TokenService;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Minimum length accepted for a replacement password.
const MIN_NEW_PASSWORD_LENGTH: usize = 8;

/// Authentication service: credential verification and token issuance.
///
/// Orchestrates the user store, the password hasher, and the token service.
/// Login collapses "unknown username" and "wrong password" into one generic
/// failure, in content and in cost: when the lookup misses, verification
/// still runs against a fallback digest so the two paths hash equally.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
    token_service: Arc<TokenService>,
    fallback_digest: String,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `repository` - User store implementation
    /// * `token_service` - Token issuer, constructed once at startup from the
    ///   process-wide signing secret
    ///
    /// # Errors
    /// * `PasswordError` - Hashing the fallback digest failed
    pub fn new(
        repository: Arc<UR>,
        token_service: Arc<TokenService>,
    ) -> Result<Self, PasswordError> {
        let password_hasher = PasswordHasher::new();
        // Digest of a throwaway value; login verifies against it when the
        // username lookup misses, keeping the cost of both failure paths
        // equal. The result is discarded either way.
        let fallback_digest = password_hasher.hash("unknown-account-placeholder")?;

        Ok(Self {
            repository,
            password_hasher,
            token_service,
            fallback_digest,
        })
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        // An invalid-format username cannot name any account
        let Ok(username) = Username::new(username.to_string()) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = self.repository.find_by_username(&username).await?;

        let Some(user) = user else {
            let _ = self.password_hasher.verify(password, &self.fallback_digest);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.password_hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .token_service
            .issue(user.id, user.username.as_str())?;

        tracing::info!(user_id = user.id, "user authenticated");

        Ok(token)
    }

    async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .password_hasher
            .verify(current_password, &user.password_hash)
        {
            return Err(AuthError::InvalidCredentials);
        }

        if new_password.len() < MIN_NEW_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword {
                min: MIN_NEW_PASSWORD_LENGTH,
            });
        }

        let new_hash = self.password_hasher.hash(new_password)?;
        let affected = self
            .repository
            .update_password_hash(user_id, &new_hash)
            .await?;

        if affected == 0 {
            return Err(AuthError::Repository(UserError::NotFound(user_id)));
        }

        tracing::info!(user_id, "password changed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::NewUser;
    use crate::domain::user::models::User;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, new_user: NewUser) -> Result<User, UserError>;
            async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<u64, UserError>;
            async fn soft_delete(&self, id: i64) -> Result<(), UserError>;
        }
    }

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(SECRET, 24))
    }

    fn user_with_password(id: i64, username: &str, password: &str) -> User {
        let hash = PasswordHasher::new().hash(password).unwrap();
        User {
            id,
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{username}@example.com")).unwrap(),
            password_hash: hash,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_login_success_issues_valid_token() {
        let mut repository = MockTestUserRepository::new();
        let bob = user_with_password(7, "bob", "secret123");

        repository
            .expect_find_by_username()
            .withf(|username| username.as_str() == "bob")
            .times(1)
            .returning(move |_| Ok(Some(bob.clone())));

        let tokens = token_service();
        let service = AuthService::new(Arc::new(repository), tokens.clone()).unwrap();

        let token = service.login("bob", "secret123").await.unwrap();

        let claims = tokens.validate(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "bob");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let mut repository = MockTestUserRepository::new();
        let bob = user_with_password(7, "bob", "secret123");

        repository
            .expect_find_by_username()
            .returning(move |username| {
                if username.as_str() == "bob" {
                    Ok(Some(bob.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        let wrong_password = service.login("bob", "wrong").await.unwrap_err();
        let unknown_user = service.login("nonexistent", "anything").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_invalid_format_username() {
        let repository = MockTestUserRepository::new();
        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        // No lookup happens: a name like this cannot exist
        let result = service.login("no such user", "anything").await;
        assert!(matches!(result.unwrap_err(), AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_store_error_is_distinct() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));

        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        let result = service.login("bob", "secret123").await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::Repository(UserError::DatabaseError(_))
        ));
    }

    #[tokio::test]
    async fn test_change_password_success() {
        let mut repository = MockTestUserRepository::new();
        let bob = user_with_password(7, "bob", "secret123");

        repository
            .expect_find_by_id()
            .with(eq(7))
            .times(1)
            .returning(move |_| Ok(Some(bob.clone())));

        repository
            .expect_update_password_hash()
            .withf(|id, hash| *id == 7 && hash.starts_with("$argon2"))
            .times(1)
            .returning(|_, _| Ok(1));

        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        assert!(service
            .change_password(7, "secret123", "longenough1")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_change_password_rejects_wrong_current() {
        let mut repository = MockTestUserRepository::new();
        let bob = user_with_password(7, "bob", "secret123");

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(bob.clone())));
        repository.expect_update_password_hash().times(0);

        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        let result = service.change_password(7, "wrong", "longenough1").await;
        assert!(matches!(result.unwrap_err(), AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_change_password_rejects_short_new_password() {
        let mut repository = MockTestUserRepository::new();
        let bob = user_with_password(7, "bob", "secret123");

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(bob.clone())));
        repository.expect_update_password_hash().times(0);

        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        let result = service.change_password(7, "secret123", "short").await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::WeakPassword { min: 8 }
        ));
    }

    #[tokio::test]
    async fn test_change_password_checks_current_before_policy() {
        let mut repository = MockTestUserRepository::new();
        let bob = user_with_password(7, "bob", "secret123");

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(bob.clone())));
        repository.expect_update_password_hash().times(0);

        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        // Both checks would fail; the current-password check wins
        let result = service.change_password(7, "wrong", "short").await;
        assert!(matches!(result.unwrap_err(), AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_change_password_unknown_user() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        let result = service.change_password(404, "secret123", "longenough1").await;
        assert!(matches!(result.unwrap_err(), AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_change_password_store_error_is_distinct() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));

        let service = AuthService::new(Arc::new(repository), token_service()).unwrap();

        let result = service.change_password(7, "secret123", "longenough1").await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::Repository(UserError::DatabaseError(_))
        ));
    }
}
