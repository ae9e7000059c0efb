use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_CORS_ORIGIN: &str = "cors-origin";

#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Exact origins allowed by CORS; empty means every origin is mirrored.
    pub origins: Vec<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let origins = matches
            .get_many::<String>(ARG_CORS_ORIGIN)
            .map(|values| {
                values
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self { origins }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_CORS_ORIGIN)
            .long(ARG_CORS_ORIGIN)
            .help("Allowed CORS origin, repeat for more (default: any origin)")
            .env("GATEHOUSE_CORS_ORIGINS")
            .value_delimiter(',')
            .action(ArgAction::Append),
    )
}
