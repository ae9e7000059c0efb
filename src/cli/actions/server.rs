use crate::{
    api::{self, AuthConfig},
    cli::{commands::idp, telemetry},
    idp::IdpClient,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub idp: idp::Options,
    pub cors_origins: Vec<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the IdP client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let mut client = IdpClient::new(&args.idp.url, args.idp.api_key, args.idp.timeout)
        .context("Invalid identity provider configuration")?;

    if let Some(redirect_url) = &args.idp.redirect_url {
        client = client
            .with_redirect_url(redirect_url)
            .context("Invalid identity provider configuration")?;
    }

    let auth_config = AuthConfig::new().with_error_mode(args.idp.error_mode);

    let result = api::new(args.port, Arc::new(client), auth_config, &args.cors_origins).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let cors = if args.cors_origins.is_empty() {
        "any (mirrored)".to_string()
    } else {
        args.cors_origins.join(", ")
    };
    let entries = [
        ("listen", format!("0.0.0.0:{}", args.port)),
        ("idp_url", args.idp.url.clone()),
        ("idp_timeout", format!("{}s", args.idp.timeout.as_secs())),
        (
            "idp_redirect_url",
            args.idp
                .redirect_url
                .clone()
                .unwrap_or_else(|| "none".to_string()),
        ),
        ("error_mode", args.idp.error_mode.as_str().to_string()),
        ("cors_origins", cors),
    ];
    info!("{}", startup_message(&entries));
}

fn startup_message(entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "gatehouse {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    message
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
