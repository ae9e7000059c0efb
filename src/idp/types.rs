//! Payloads exchanged with the IdP.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(super) const DEFAULT_TOKEN_TYPE: &str = "bearer";

/// Body of the sign-up and password grant calls, sent as-is.
#[derive(Serialize)]
pub(super) struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Session issued by the IdP after a successful password grant.
///
/// Only the fields the gateway relays are kept; refresh tokens and expiry
/// data stay with the IdP response.
#[derive(Deserialize, Clone)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    pub user: Value,
}

impl Session {
    /// Token type as issued, `bearer` when the IdP leaves it out.
    #[must_use]
    pub fn token_type(&self) -> &str {
        self.token_type.as_deref().unwrap_or(DEFAULT_TOKEN_TYPE)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"***")
            .field("token_type", &self.token_type())
            .field("user", &self.user)
            .finish()
    }
}

/// Pull the user record out of a sign-up response.
///
/// Depending on whether the IdP auto-confirms accounts, sign-up answers with a
/// bare user object or with a session that embeds it.
pub(super) fn signup_user(body: Value) -> Option<Value> {
    match body {
        Value::Object(mut map) => match map.remove("user") {
            Some(user @ Value::Object(_)) => Some(user),
            _ if map.contains_key("id") => Some(Value::Object(map)),
            _ => None,
        },
        _ => None,
    }
}
