use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use git_release_tag::cli::{run_release_workflow, Args};
use git_release_tag::config::Config;
use git_release_tag::git::{DryRunRepository, Git2Repository};
use git_release_tag::ui::{self, TerminalOperator};
use git_release_tag::ReleaseError;

fn main() {
    if let Err(e) = run() {
        ui::display_error(&format!("{:#}", e));
        let code = e
            .downcast_ref::<ReleaseError>()
            .map(ReleaseError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.into_config()?;
    tracing::debug!(?config, "resolved configuration");

    let repo = Git2Repository::open(".").context("Not inside a git repository")?;
    let mut operator = TerminalOperator::stdin();

    if config.dry_run {
        ui::display_status("Dry run: mutating git commands are printed, not executed");
        let repo = DryRunRepository::new(repo);
        release(&config, &repo, &mut operator)
    } else {
        release(&config, &repo, &mut operator)
    }
}

fn release<R: git_release_tag::git::Repository>(
    config: &Config,
    repo: &R,
    operator: &mut TerminalOperator<std::io::StdinLock<'static>>,
) -> Result<()> {
    let outcome = run_release_workflow(config, repo, operator)?;
    ui::display_summary(&outcome.summary, outcome.dry_run);
    Ok(())
}
