//! Main workflow orchestration logic
//!
//! Runs one release: preconditions, suggestions, operator prompts, local
//! tagging, and the atomic publication. Works against any [Repository] and
//! [Operator], so it runs the same on a real repository, a dry-run wrapper,
//! or the in-memory mock.

use crate::analyzer::TagSuggester;
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::tag::{validate_major, validate_semver};
use crate::domain::Tag;
use crate::error::{ReleaseError, Result};
use crate::git::{short_oid, Repository};
use crate::release::{DualPushCoordinator, PublishedRelease, TagWriter};
use crate::ui::{self, Operator};

pub const MAJOR_PROMPT: &str = "Moving major tag";
pub const SEMVER_PROMPT: &str = "Semver tag";
pub const MESSAGE_PROMPT: &str = "Tag message";

/// Result of a successful release run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub published: PublishedRelease,
    /// (tag, short commit) for each tag; under dry run, where it would point
    pub summary: Vec<(String, String)>,
    pub dry_run: bool,
}

/// Main release workflow
///
/// Orchestrates the entire tagging process:
/// 1. Check the working tree is clean and the remote's default branch resolves
/// 2. Fetch tags; fast-forward the default branch if it is checked out
/// 3. Prompt for the major tag, semver tag and message, offering suggestions
/// 4. Create the semver tag and move the major tag locally
/// 5. Push both in one leased atomic transaction
///
/// Declining any confirmation returns `Cancelled` before anything is pushed.
pub fn run_release_workflow<R: Repository, O: Operator>(
    config: &Config,
    repo: &R,
    operator: &mut O,
) -> Result<ReleaseOutcome> {
    let remote = config.remote.as_str();

    // Checked once; not re-verified after the prompts.
    if !repo.is_working_tree_clean()? {
        return Err(ReleaseError::DirtyWorkingTree);
    }

    let default_branch = repo.detect_default_branch(remote)?;
    tracing::info!(remote, branch = %default_branch, "resolved default branch");

    ui::display_status(&format!("Fetching tags from '{}'...", remote));
    repo.fetch(remote)?;

    let current_branch = repo.current_branch()?;
    if current_branch.as_deref() == Some(default_branch.as_str()) {
        repo.fast_forward(remote, &default_branch)?;
    } else {
        ui::display_boundary_warning(&BoundaryWarning::FastForwardSkipped {
            default_branch: default_branch.clone(),
            current_branch,
        });
    }

    let suggester = TagSuggester::new(repo);
    let ignored = suggester.ignored_tags()?;
    if !ignored.is_empty() {
        ui::display_boundary_warning(&BoundaryWarning::IgnoredMalformedTags { tags: ignored });
    }

    let suggested_major = suggester.suggest_major()?;
    let major = operator
        .prompt(MAJOR_PROMPT, &suggested_major)?
        .resolve(&suggested_major);
    let major_number = validate_major(&major)?;

    let suggested_semver = suggester.suggest_semver(&major)?;
    let semver = operator
        .prompt(SEMVER_PROMPT, &suggested_semver)?
        .resolve(&suggested_semver);
    let version = validate_semver(&semver)?;

    if version.major != major_number {
        ui::display_boundary_warning(&BoundaryWarning::MajorComponentMismatch {
            semver: semver.clone(),
            major: major.clone(),
        });
        if !operator.confirm(&format!(
            "Tag {} is not in the {} line. Continue anyway?",
            semver, major
        ))? {
            return Err(ReleaseError::cancelled(format!(
                "{} does not match major tag {}",
                semver, major
            )));
        }
    }

    if repo.local_tag_oid(&semver)?.is_some() {
        return Err(ReleaseError::duplicate_local(&semver));
    }

    if let Some(existing) = repo.tag_target(&major)? {
        ui::display_boundary_warning(&BoundaryWarning::MajorTagExists {
            major: major.clone(),
            current_commit_hash: existing.to_string(),
        });
        if !operator.confirm(&format!("Move existing tag {}?", major))? {
            return Err(ReleaseError::cancelled(format!("kept existing tag {}", major)));
        }
    }

    let default_message = config.tag_message(&semver);
    let message = operator
        .prompt(MESSAGE_PROMPT, &default_message)?
        .resolve(&default_message);

    let head = repo.head_commit()?;
    let semver_tag = Tag::semver(semver, head, message.clone())?;
    let major_tag = Tag::major(major, head, message)?;

    ui::display_release_plan(&semver_tag.name, &major_tag.name, remote);

    let writer = TagWriter::new(repo);
    writer.create_annotated(&semver_tag)?;
    writer.force_move(&major_tag)?;

    let published = DualPushCoordinator::new(repo, remote).publish(&semver_tag, &major_tag)?;
    if !config.dry_run {
        ui::display_success(&format!(
            "Pushed {} and {} to '{}'",
            semver_tag.name, major_tag.name, remote
        ));
    }

    let mut summary = Vec::new();
    for tag in [&semver_tag, &major_tag] {
        let commit = if config.dry_run {
            head
        } else {
            repo.tag_target(&tag.name)?.unwrap_or(tag.target)
        };
        summary.push((tag.name.clone(), short_oid(commit)));
    }

    Ok(ReleaseOutcome {
        published,
        summary,
        dry_run: config.dry_run,
    })
}
