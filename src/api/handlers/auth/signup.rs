use super::{
    AuthConfig,
    error::GatewayError,
    types::{CredentialsRequest, ErrorResponse, SignUpResponse},
    utils::read_credentials,
};
use crate::idp::IdpClient;
use axum::{
    Json,
    body::Bytes,
    extract::Extension,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;
use tracing::{info, instrument};

const SIGNUP_MESSAGE: &str = "User created successfully";

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created by the identity provider", body = SignUpResponse),
        (status = 400, description = "Identity provider refused the signup", body = ErrorResponse),
        (status = 422, description = "Missing or malformed credentials", body = ErrorResponse),
    ),
    tag = "auth"
)]
/// Forward a signup to the IdP and relay the user it created.
#[instrument(skip(idp, config, headers, body))]
pub async fn signup(
    idp: Extension<Arc<IdpClient>>,
    config: Extension<AuthConfig>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SignUpResponse>), GatewayError> {
    let credentials = read_credentials(&headers, &body)?;

    let user = idp
        .sign_up(&credentials.email, &credentials.password)
        .await
        .map_err(|err| GatewayError::idp(err, config.error_mode()))?;

    info!("Signup forwarded");

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: SIGNUP_MESSAGE.to_string(),
            user,
        }),
    ))
}
