use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::delete_user::delete_user;
use super::handlers::get_user::get_user;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::register::register;
use super::handlers::update_user::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::service::AuthService;
use crate::domain::user::service::UserService;
use crate::outbound::repositories::PostgresUserRepository;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<PostgresUserRepository>>,
    pub auth_service: Arc<AuthService<PostgresUserRepository>>,
    pub token_service: Arc<TokenService>,
}

pub fn create_router(
    user_service: Arc<UserService<PostgresUserRepository>>,
    auth_service: Arc<AuthService<PostgresUserRepository>>,
    token_service: Arc<TokenService>,
) -> Router {
    let state = AppState {
        user_service,
        auth_service,
        token_service,
    };

    let public_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register));

    let protected_routes = Router::new()
        .route("/api/me", get(me))
        .route("/api/password", patch(change_password))
        .route("/api/users", get(list_users))
        .route("/api/users/:user_id", get(get_user))
        .route("/api/users/:user_id", patch(update_user))
        .route("/api/users/:user_id", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            state.token_service.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
