use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

// Fields the IdP uses for human readable errors, in order of preference.
const MESSAGE_FIELDS: [&str; 4] = ["msg", "error_description", "message", "error"];

/// Failure of a forwarded IdP call.
///
/// `Display` is the IdP's own error text, so callers can relay it verbatim.
#[derive(Debug, Error)]
pub enum IdpError {
    /// The IdP refused the input (malformed email, weak password, ...).
    #[error("{message}")]
    Validation { status: StatusCode, message: String },
    /// Wrong credentials, invalid token or rate limited by the IdP.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    /// The account already exists.
    #[error("{message}")]
    Conflict { status: StatusCode, message: String },
    /// The IdP failed or answered with something we cannot read.
    #[error("{message}")]
    Upstream {
        status: Option<StatusCode>,
        message: String,
    },
    /// The request never completed (connect failure, timeout, broken body).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl IdpError {
    /// Classify a non-success IdP response.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let json: Option<Value> = serde_json::from_str(body).ok();

        let message = json
            .as_ref()
            .and_then(error_message)
            .map(str::to_string)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("identity provider error")
                    .to_string()
            });

        let error_code = json
            .as_ref()
            .and_then(|json| json.get("error_code"))
            .and_then(Value::as_str);
        let oauth_error = json
            .as_ref()
            .and_then(|json| json.get("error"))
            .and_then(Value::as_str);

        if status.is_server_error() {
            Self::Upstream {
                status: Some(status),
                message,
            }
        } else if matches!(error_code, Some("user_already_exists" | "email_exists"))
            || message.to_lowercase().contains("already registered")
        {
            Self::Conflict { status, message }
        } else if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
        ) || error_code == Some("invalid_credentials")
            || oauth_error == Some("invalid_grant")
        {
            Self::Rejected { status, message }
        } else if status.is_client_error() {
            Self::Validation { status, message }
        } else {
            Self::Upstream {
                status: Some(status),
                message,
            }
        }
    }

    /// Status code returned by the IdP, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Validation { status, .. }
            | Self::Rejected { status, .. }
            | Self::Conflict { status, .. } => Some(*status),
            Self::Upstream { status, .. } => *status,
            Self::Transport(err) => err.status(),
        }
    }
}

fn error_message(json: &Value) -> Option<&str> {
    MESSAGE_FIELDS.iter().find_map(|field| {
        json.get(field)
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
    })
}
