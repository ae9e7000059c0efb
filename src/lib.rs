//! # Gatehouse (Credential Gateway)
//!
//! `gatehouse` is a thin HTTP façade in front of a managed identity provider
//! (IdP). It accepts sign-up, sign-in and sign-out requests, forwards the
//! credentials unmodified to the IdP and relays the result back to the caller.
//!
//! Nothing is stored locally: passwords, sessions and tokens are owned by the
//! IdP. The gateway only holds one immutable IdP client handle, created at
//! start-up and shared by every request.
//!
//! ## Error mapping
//!
//! IdP failures are classified internally (validation, rejected credentials,
//! conflict, upstream, transport). By default every kind is answered with
//! `400 {"detail": "<idp message>"}`; `--error-mode strict` maps each kind to
//! its own status code instead.

pub mod api;
pub mod cli;
pub mod idp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
