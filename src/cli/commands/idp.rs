use crate::api::ErrorMode;
use clap::{Arg, ArgMatches, Command, builder::PossibleValuesParser};
use secrecy::SecretString;
use std::time::Duration;

pub const ARG_IDP_URL: &str = "idp-url";
pub const ARG_IDP_API_KEY: &str = "idp-api-key";
pub const ARG_IDP_TIMEOUT: &str = "idp-timeout";
pub const ARG_ERROR_MODE: &str = "error-mode";
pub const ARG_IDP_REDIRECT_URL: &str = "idp-redirect-url";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub api_key: SecretString,
    pub timeout: Duration,
    pub error_mode: ErrorMode,
    pub redirect_url: Option<String>,
}

impl Options {
    /// Parse IdP arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL or API key is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_required = |id: &str| -> anyhow::Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        let timeout = matches.get_one::<u64>(ARG_IDP_TIMEOUT).copied().unwrap_or(10);

        let error_mode = matches
            .get_one::<String>(ARG_ERROR_MODE)
            .map(|mode| mode.parse::<ErrorMode>())
            .transpose()
            .map_err(|e| anyhow::anyhow!(e))?
            .unwrap_or_default();

        Ok(Self {
            url: read_required(ARG_IDP_URL)?,
            api_key: SecretString::from(read_required(ARG_IDP_API_KEY)?),
            timeout: Duration::from_secs(timeout),
            error_mode,
            redirect_url: matches
                .get_one::<String>(ARG_IDP_REDIRECT_URL)
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDP_URL)
                .long(ARG_IDP_URL)
                .help("Identity provider base URL, example: https://<project>.supabase.co")
                .env("GATEHOUSE_IDP_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_IDP_API_KEY)
                .long(ARG_IDP_API_KEY)
                .help("Identity provider API key")
                .env("GATEHOUSE_IDP_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_IDP_TIMEOUT)
                .long(ARG_IDP_TIMEOUT)
                .help("Timeout in seconds for each identity provider request")
                .env("GATEHOUSE_IDP_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_IDP_REDIRECT_URL)
                .long(ARG_IDP_REDIRECT_URL)
                .help("Where signup confirmation emails link to, example: https://app.example.com/auth/callback")
                .env("GATEHOUSE_IDP_REDIRECT_URL"),
        )
        .arg(
            Arg::new(ARG_ERROR_MODE)
                .long(ARG_ERROR_MODE)
                .help("How identity provider failures are reported")
                .long_help(
                    "How identity provider failures are reported. `compat` answers 400 for every failure; `strict` answers 400, 401, 409, 502 or 503 depending on the failure.",
                )
                .env("GATEHOUSE_ERROR_MODE")
                .default_value(ErrorMode::Compat.as_str())
                .value_parser(PossibleValuesParser::new(ErrorMode::VARIANTS)),
        )
}
