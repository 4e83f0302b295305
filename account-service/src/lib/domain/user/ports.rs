use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Create new user with validated fields; the password is hashed before
    /// it reaches the store.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist (or is soft-deleted)
    /// * `DatabaseError` - Store operation failed
    async fn get_user(&self, id: i64) -> Result<User, UserError>;

    /// Retrieve all users.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Update existing user with optional fields.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn update_user(&self, id: i64, command: UpdateUserCommand) -> Result<User, UserError>;

    /// Soft-delete existing user. The row is retained but becomes invisible
    /// to all lookups.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Store operation failed
    async fn delete_user(&self, id: i64) -> Result<(), UserError>;
}

/// Persistence operations for the user aggregate (the "user store").
///
/// Soft-deleted rows are excluded from every lookup.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage; the store assigns id and timestamps.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn create(&self, new_user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found or soft-deleted)
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found or soft-deleted)
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve all live users from storage.
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Store operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Replace the stored password hash for a user.
    ///
    /// # Returns
    /// Number of rows affected (0 when the user does not exist)
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<u64, UserError>;

    /// Mark a user as deleted.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Store operation failed
    async fn soft_delete(&self, id: i64) -> Result<(), UserError>;
}
