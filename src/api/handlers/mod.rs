//! API handlers for the credential gateway.
//!
//! `auth` holds the forwarded operations; `health` reports the IdP dependency.

pub mod auth;
pub mod health;
