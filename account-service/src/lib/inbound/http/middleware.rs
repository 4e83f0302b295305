use std::sync::Arc;

use auth::TokenService;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

/// Verified identity attached to every request that passes the gate.
///
/// Produced exclusively by [`authenticate`]; downstream handlers read it via
/// `Extension<AuthenticatedUser>` without re-validating the token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}

/// Middleware that validates bearer tokens and attaches the verified
/// identity to request extensions.
///
/// Rejections carry generic messages only; the reason a token failed is
/// never surfaced to the caller.
pub async fn authenticate(
    State(token_service): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // Extract token from Authorization header
    let token = extract_bearer_token(&req)?;

    let claims = token_service.validate(token).map_err(|_| {
        tracing::warn!("rejected request carrying an invalid bearer token");
        unauthorized("invalid or expired token")
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.user_id,
        username: claims.username,
    });

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("authentication required"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("malformed authentication header"))?;

    // Exactly two parts, case-insensitive scheme
    let parts: Vec<&str> = auth_str.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(unauthorized("malformed authentication header")),
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": message
        })),
    )
        .into_response()
}
