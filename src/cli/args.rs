use clap::Parser;

use crate::config::{self, Config};
use crate::error::Result;

/// Command-line options. There are no positional arguments; every option
/// can also be set through the environment.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "git-release-tag",
    version,
    about = "Create a vX.Y.Z release tag, move the vX alias to it, and push both atomically"
)]
pub struct Args {
    #[arg(
        long,
        env = "UPSTREAM_REMOTE",
        help = "Remote to read tags from and publish to [default: upstream]"
    )]
    pub remote: Option<String>,

    #[arg(
        long,
        env = "DRY_RUN",
        action = clap::ArgAction::SetTrue,
        value_parser = parse_dry_run,
        help = "Print mutating git commands instead of running them (DRY_RUN=0|1)"
    )]
    pub dry_run: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    pub config: Option<String>,
}

impl Args {
    /// Build the run configuration, layering in the config file
    pub fn into_config(self) -> Result<Config> {
        let file = config::load_config(self.config.as_deref())?;
        Config::resolve(self.remote, self.dry_run, file)
    }
}

/// Accepts `0`/`1` as used in the environment, plus `true`/`false` which
/// clap passes when the flag is given on the command line.
fn parse_dry_run(value: &str) -> std::result::Result<bool, String> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        other => Err(format!("expected 0 or 1, got '{}'", other)),
    }
}
