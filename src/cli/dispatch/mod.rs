//! Maps validated CLI matches to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{self, cors, idp};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(commands::DEFAULT_PORT);

    let idp = idp::Options::parse(matches)?;
    let cors = cors::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        idp,
        cors_origins: cors.origins,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorMode;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_action_from_env() {
        temp_env::with_vars(
            [
                ("GATEHOUSE_IDP_URL", Some("https://project.supabase.co")),
                ("GATEHOUSE_IDP_API_KEY", Some("anon-key")),
                ("GATEHOUSE_PORT", Some("8081")),
                ("GATEHOUSE_IDP_TIMEOUT", None),
                ("GATEHOUSE_ERROR_MODE", Some("strict")),
                ("GATEHOUSE_CORS_ORIGINS", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["gatehouse"]);
                let action = handler(&matches);
                assert!(action.is_ok());

                let Ok(Action::Server(args)) = action else {
                    return;
                };
                assert_eq!(args.port, 8081);
                assert_eq!(args.idp.url, "https://project.supabase.co");
                assert_eq!(args.idp.api_key.expose_secret(), "anon-key");
                assert_eq!(args.idp.timeout.as_secs(), 10);
                assert_eq!(args.idp.error_mode, ErrorMode::Strict);
                assert!(args.cors_origins.is_empty());
            },
        );
    }

    #[test]
    fn handler_rejects_blank_api_key() {
        temp_env::with_vars(
            [
                ("GATEHOUSE_IDP_URL", Some("https://project.supabase.co")),
                ("GATEHOUSE_IDP_API_KEY", Some("   ")),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["gatehouse"]);
                let err = handler(&matches).err().map(|e| e.to_string());
                assert_eq!(
                    err.as_deref(),
                    Some("missing required argument: --idp-api-key")
                );
            },
        );
    }

    #[test]
    fn handler_drops_empty_cors_entries() {
        temp_env::with_vars(
            [
                ("GATEHOUSE_IDP_URL", Some("https://project.supabase.co")),
                ("GATEHOUSE_IDP_API_KEY", Some("anon-key")),
                (
                    "GATEHOUSE_CORS_ORIGINS",
                    Some("https://app.example.com, ,https://admin.example.com"),
                ),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["gatehouse"]);
                let Ok(Action::Server(args)) = handler(&matches) else {
                    panic!("expected a server action");
                };
                assert_eq!(
                    args.cors_origins,
                    vec![
                        "https://app.example.com".to_string(),
                        "https://admin.example.com".to_string()
                    ]
                );
            },
        );
    }
}
