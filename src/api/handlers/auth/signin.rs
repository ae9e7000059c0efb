use super::{
    AuthConfig,
    error::GatewayError,
    types::{CredentialsRequest, ErrorResponse, SignInResponse},
    utils::read_credentials,
};
use crate::idp::IdpClient;
use axum::{Json, body::Bytes, extract::Extension, http::HeaderMap};
use std::sync::Arc;
use tracing::{info, instrument};

#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Session issued by the identity provider", body = SignInResponse),
        (status = 400, description = "Identity provider rejected the credentials", body = ErrorResponse),
        (status = 422, description = "Missing or malformed credentials", body = ErrorResponse),
    ),
    tag = "auth"
)]
/// Exchange credentials for an IdP session; token and type are relayed as issued.
#[instrument(skip(idp, config, headers, body))]
pub async fn signin(
    idp: Extension<Arc<IdpClient>>,
    config: Extension<AuthConfig>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SignInResponse>, GatewayError> {
    let credentials = read_credentials(&headers, &body)?;

    let session = idp
        .sign_in_with_password(&credentials.email, &credentials.password)
        .await
        .map_err(|err| GatewayError::idp(err, config.error_mode()))?;

    info!("Signin forwarded");

    Ok(Json(SignInResponse {
        token_type: session.token_type().to_string(),
        access_token: session.access_token,
        user: session.user,
    }))
}
