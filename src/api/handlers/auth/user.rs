use super::{
    AuthConfig,
    error::GatewayError,
    types::{ErrorResponse, UserResponse},
    utils::bearer_token,
};
use crate::idp::IdpClient;
use axum::{Json, extract::Extension, http::HeaderMap};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    get,
    path = "/auth/user",
    responses(
        (status = 200, description = "User owning the bearer token", body = UserResponse),
        (status = 401, description = "Missing, expired or invalid bearer token", body = ErrorResponse),
        (status = 502, description = "Identity provider failed (strict mode)", body = ErrorResponse),
        (status = 503, description = "Identity provider unreachable (strict mode)", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "auth"
)]
#[instrument(skip(idp, config, headers))]
pub async fn current_user(
    idp: Extension<Arc<IdpClient>>,
    config: Extension<AuthConfig>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, GatewayError> {
    let access_token = bearer_token(&headers).ok_or(GatewayError::Unauthenticated)?;

    let user = idp
        .get_user(&access_token)
        .await
        .map_err(|err| GatewayError::session(err, config.error_mode()))?;

    Ok(Json(UserResponse { user }))
}
