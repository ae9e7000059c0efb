//! Gateway settings shared by the auth handlers.

use std::str::FromStr;

/// How IdP failures are surfaced to HTTP clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Every IdP failure is a `400` carrying the IdP message.
    #[default]
    Compat,
    /// Each failure kind gets its own status code (401, 409, 502, 503, ...).
    Strict,
}

impl ErrorMode {
    pub const VARIANTS: [&'static str; 2] = ["compat", "strict"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compat => "compat",
            Self::Strict => "strict",
        }
    }
}

impl FromStr for ErrorMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "compat" => Ok(Self::Compat),
            "strict" => Ok(Self::Strict),
            other => Err(format!("invalid error mode: {other}")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    error_mode: ErrorMode,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    #[must_use]
    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }
}
