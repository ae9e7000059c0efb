use super::{error::GatewayError, types::CredentialsRequest};
use axum::{
    body::Bytes,
    http::{
        HeaderMap,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};

const EXPECTED_JSON: &str = "Expected request with `Content-Type: application/json`";

/// Extract the token from an `Authorization: Bearer <token>` header.
pub(super) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Parse a credentials body. A missing `Content-Type` is read as JSON; any
/// other non-JSON content type is refused.
pub(super) fn read_credentials(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<CredentialsRequest, GatewayError> {
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        let is_json = content_type
            .to_str()
            .ok()
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .is_some_and(|mime| {
                mime.eq_ignore_ascii_case("application/json")
                    || (mime.starts_with("application/") && mime.ends_with("+json"))
            });
        if !is_json {
            return Err(GatewayError::InvalidPayload(EXPECTED_JSON.to_string()));
        }
    }

    if body.is_empty() {
        return Err(GatewayError::InvalidPayload(
            "Request body is required".to_string(),
        ));
    }

    serde_json::from_slice(body)
        .map_err(|err| GatewayError::InvalidPayload(format!("Invalid request body: {err}")))
}
