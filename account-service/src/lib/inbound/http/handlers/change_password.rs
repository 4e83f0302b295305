use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Change the password of the account behind the verified request identity.
///
/// Tokens issued before the change stay valid until they expire.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(body): Json<ChangePasswordRequestBody>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .auth_service
        .change_password(
            auth_user.user_id,
            &body.current_password,
            &body.new_password,
        )
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, ()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequestBody {
    current_password: String,
    new_password: String,
}
