//! Auth handlers.
//!
//! Each handler forwards one operation to the IdP and maps the outcome to an
//! HTTP response. Credentials are passed through byte-for-byte; the gateway
//! never validates email format or password strength.
//!
//! ## Sessions
//!
//! The gateway keeps no session state. Sign-out and current-user lookups name
//! the session explicitly with `Authorization: Bearer <access_token>`, the
//! token issued by `/auth/signin`.

mod error;
pub(crate) mod signin;
pub(crate) mod signout;
pub(crate) mod signup;
mod state;
pub(crate) mod types;
pub(crate) mod user;
mod utils;

pub use state::{AuthConfig, ErrorMode};
