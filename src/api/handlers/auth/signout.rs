use super::{
    AuthConfig,
    error::GatewayError,
    types::{ErrorResponse, MessageResponse},
    utils::bearer_token,
};
use crate::idp::IdpClient;
use axum::{Json, extract::Extension, http::HeaderMap};
use std::sync::Arc;
use tracing::{debug, instrument};

const SIGNOUT_MESSAGE: &str = "Successfully signed out";

#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 200, description = "Session revoked, or no session was presented", body = MessageResponse),
        (status = 400, description = "Identity provider refused the signout", body = ErrorResponse),
    ),
    security(
        (),
        ("bearer" = [])
    ),
    tag = "auth"
)]
/// Revoke the session named by the bearer token.
///
/// Without a token there is nothing to revoke and the call succeeds.
#[instrument(skip(idp, config, headers))]
pub async fn signout(
    idp: Extension<Arc<IdpClient>>,
    config: Extension<AuthConfig>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, GatewayError> {
    if let Some(access_token) = bearer_token(&headers) {
        idp.sign_out(&access_token)
            .await
            .map_err(|err| GatewayError::idp(err, config.error_mode()))?;
    } else {
        debug!("Signout without bearer token, nothing to revoke");
    }

    Ok(Json(MessageResponse {
        message: SIGNOUT_MESSAGE.to_string(),
    }))
}
