//! System git invocation for the atomic dual-tag push
//!
//! libgit2 cannot submit an atomic push or a `--force-with-lease` update, so
//! the push goes through the `git` binary. Everything else is read through
//! `git2`.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::domain::{Expectation, PushOutcome, PushTransaction, Rejection};
use crate::error::{ReleaseError, Result};

/// Runs `git` against a repository working directory
pub struct SystemGit {
    repo_path: PathBuf,
}

impl SystemGit {
    pub fn new(repo_path: impl AsRef<Path>) -> Self {
        SystemGit {
            repo_path: repo_path.as_ref().to_path_buf(),
        }
    }

    /// Create a git command bound to the repository
    ///
    /// Overrides user configuration that would change the porcelain output.
    pub(crate) fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.repo_path);
        cmd.arg("-c").arg("core.quotePath=false");
        cmd.arg("-c").arg("push.followTags=false");
        cmd
    }

    /// Push a transaction with `git push --atomic --porcelain`
    ///
    /// A non-zero exit with parseable per-ref rejections is reported as
    /// [PushOutcome::Rejected]; anything else is a command failure.
    pub fn push_atomic(&self, remote: &str, transaction: &PushTransaction) -> Result<PushOutcome> {
        let args = transaction.to_git_args(remote);
        tracing::debug!(command = %format!("git {}", args.join(" ")), "running atomic push");

        let output = self.git_cmd().args(&args).output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            return Ok(PushOutcome::Applied);
        }

        let rejections = parse_porcelain_rejections(&stdout, transaction);
        if rejections.is_empty() {
            return Err(ReleaseError::command(
                format!("git {}", args.join(" ")),
                stderr.trim().to_string(),
            ));
        }

        tracing::debug!(?rejections, "remote rejected atomic push");
        Ok(PushOutcome::Rejected(rejections))
    }
}

/// Extract per-reference rejections from `git push --porcelain` output.
///
/// Porcelain lines look like `!\t<src>:<dst>\t[rejected] (stale info)`.
/// Refs refused only because a sibling failed (`atomic push failed`) are
/// collateral and skipped.
pub fn parse_porcelain_rejections(stdout: &str, transaction: &PushTransaction) -> Vec<Rejection> {
    let mut rejections = Vec::new();

    for line in stdout.lines() {
        let mut fields = line.split('\t');
        if fields.next() != Some("!") {
            continue;
        }
        let (Some(refspec), Some(summary)) = (fields.next(), fields.next()) else {
            continue;
        };
        let reference = refspec
            .split_once(':')
            .map(|(_, dst)| dst)
            .unwrap_or(refspec)
            .to_string();

        if summary.contains("atomic push failed") {
            continue;
        }

        if summary.contains("stale info") {
            let expected = transaction
                .updates()
                .iter()
                .find(|update| update.destination == reference)
                .and_then(|update| match update.expectation {
                    Expectation::Lease(expected) => expected,
                    Expectation::Create => None,
                });
            rejections.push(Rejection::StaleLease {
                reference,
                expected,
            });
        } else if summary.contains("already exists") {
            rejections.push(Rejection::AlreadyExists { reference });
        } else {
            rejections.push(Rejection::Other {
                reference,
                reason: summary.to_string(),
            });
        }
    }

    rejections
}
