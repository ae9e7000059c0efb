//! Error boundary of the auth handlers.

use super::{state::ErrorMode, types::ErrorResponse};
use crate::idp::IdpError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

#[derive(Debug)]
pub enum GatewayError {
    /// Request body is missing or does not have the expected shape.
    InvalidPayload(String),
    /// No bearer token on a request that needs one.
    Unauthenticated,
    /// The forwarded IdP call failed.
    Idp { error: IdpError, mode: ErrorMode },
    /// The IdP could not resolve the bearer token to a user.
    Session { error: IdpError, mode: ErrorMode },
}

impl GatewayError {
    pub(crate) fn idp(error: IdpError, mode: ErrorMode) -> Self {
        Self::Idp { error, mode }
    }

    pub(crate) fn session(error: IdpError, mode: ErrorMode) -> Self {
        Self::Session { error, mode }
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Idp { error, mode } => idp_status(error, *mode),
            Self::Session { error, mode } => session_status(error, *mode),
        }
    }
}

/// Compat mode answers `400` for everything, strict mode keeps the failure kind.
fn idp_status(error: &IdpError, mode: ErrorMode) -> StatusCode {
    match mode {
        ErrorMode::Compat => StatusCode::BAD_REQUEST,
        ErrorMode::Strict => match error {
            IdpError::Validation { .. } => StatusCode::BAD_REQUEST,
            IdpError::Rejected { .. } => StatusCode::UNAUTHORIZED,
            IdpError::Conflict { .. } => StatusCode::CONFLICT,
            IdpError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            IdpError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        },
    }
}

/// Token lookups answer `401` unless strict mode reports an unhealthy IdP.
fn session_status(error: &IdpError, mode: ErrorMode) -> StatusCode {
    match (mode, error) {
        (ErrorMode::Strict, IdpError::Upstream { .. } | IdpError::Transport(_)) => {
            idp_status(error, mode)
        }
        _ => StatusCode::UNAUTHORIZED,
    }
}

impl IntoResponse for GatewayError {
    /// Every failure becomes `{"detail": "<message>"}`; nothing escapes as a 500.
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = match self {
            Self::InvalidPayload(detail) => {
                warn!("Invalid payload: {detail}");
                detail
            }
            Self::Unauthenticated => "Not authenticated".to_string(),
            Self::Idp { error, .. } | Self::Session { error, .. } => {
                match &error {
                    IdpError::Upstream { .. } | IdpError::Transport(_) => {
                        error!("Identity provider failure: {error}");
                    }
                    _ => warn!(
                        idp.status = ?error.status(),
                        "Identity provider refused request: {error}"
                    ),
                }
                error.to_string()
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
