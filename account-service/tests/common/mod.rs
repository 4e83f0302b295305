use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::auth::service::AuthService;
use account_service::domain::user::models::CreateUserCommand;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::User;
use account_service::domain::user::models::Username;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::middleware::authenticate;
use account_service::inbound::http::middleware::AuthenticatedUser;
use account_service::user::errors::UserError;
use account_service::user::ports::UserRepository;
use async_trait::async_trait;
use auth::TokenService;
use axum::body::Body;
use axum::http::header;
use axum::http::Request;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Extension;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// In-memory user store standing in for Postgres, with the same contract:
/// unique username/email, store-assigned ids, soft-delete aware lookups.
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.username == new_user.username) {
            return Err(UserError::UsernameAlreadyExists(
                new_user.username.as_str().to_string(),
            ));
        }
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(UserError::EmailAlreadyExists(
                new_user.email.as_str().to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| &u.username == username && u.deleted_at.is_none())
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        let existing = users
            .iter_mut()
            .find(|u| u.id == user.id && u.deleted_at.is_none())
            .ok_or(UserError::NotFound(user.id))?;
        *existing = user.clone();
        Ok(user)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<u64, UserError> {
        let mut users = self.users.lock().unwrap();
        match users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<(), UserError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .ok_or(UserError::NotFound(id))?;
        user.deleted_at = Some(Utc::now());
        Ok(())
    }
}

/// The full authentication stack wired against the in-memory store: real
/// hasher, real token service, real gate middleware.
pub struct TestAuthStack {
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    pub auth_service: Arc<AuthService<InMemoryUserRepository>>,
    pub token_service: Arc<TokenService>,
}

async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
    format!("{}:{}", user.user_id, user.username)
}

impl TestAuthStack {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryUserRepository::new());
        let token_service = Arc::new(TokenService::new(TEST_SECRET, 24));
        let user_service = Arc::new(UserService::new(repository.clone()));
        let auth_service = Arc::new(
            AuthService::new(repository, token_service.clone())
                .expect("Failed to build auth service"),
        );

        Self {
            user_service,
            auth_service,
            token_service,
        }
    }

    /// One-shot a request against a route guarded by the authorization gate.
    /// The handler echoes the verified identity as `<id>:<username>`.
    pub async fn protected_request(&self, authorization: Option<&str>) -> (StatusCode, String) {
        let router = Router::new()
            .route("/protected", get(whoami))
            .route_layer(from_fn_with_state(
                self.token_service.clone(),
                authenticate,
            ));

        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }
}

pub fn create_user_command(username: &str, email: &str, password: &str) -> CreateUserCommand {
    CreateUserCommand::new(
        Username::new(username.to_string()).unwrap(),
        EmailAddress::new(email.to_string()).unwrap(),
        password.to_string(),
    )
}
