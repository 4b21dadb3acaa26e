//! Dry-run backend
//!
//! Every read goes to the wrapped backend so suggestions, leases and
//! preconditions are computed for real. Every mutation is rendered as the
//! git command that would have run, printed, and recorded.

use std::cell::{Cell, RefCell};

use git2::Oid;

use crate::domain::{PushOutcome, PushTransaction};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::ui::formatter;

pub struct DryRunRepository<R> {
    inner: R,
    commands: RefCell<Vec<String>>,
    /// Where HEAD would be after the reported pull
    pulled_head: Cell<Option<Oid>>,
}

impl<R: Repository> DryRunRepository<R> {
    pub fn new(inner: R) -> Self {
        DryRunRepository {
            inner,
            commands: RefCell::new(Vec::new()),
            pulled_head: Cell::new(None),
        }
    }

    /// Commands that would have run, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn report(&self, command: String) {
        formatter::display_dry_run(&command);
        tracing::debug!(%command, "dry run: skipped mutating command");
        self.commands.borrow_mut().push(command);
    }
}

impl<R: Repository> Repository for DryRunRepository<R> {
    fn is_working_tree_clean(&self) -> Result<bool> {
        self.inner.is_working_tree_clean()
    }

    fn detect_default_branch(&self, remote: &str) -> Result<String> {
        self.inner.detect_default_branch(remote)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        self.inner.current_branch()
    }

    fn list_tags(&self, pattern: &str) -> Result<Vec<String>> {
        self.inner.list_tags(pattern)
    }

    fn local_tag_oid(&self, name: &str) -> Result<Option<Oid>> {
        self.inner.local_tag_oid(name)
    }

    fn tag_target(&self, name: &str) -> Result<Option<Oid>> {
        self.inner.tag_target(name)
    }

    fn remote_tag_oid(&self, remote: &str, name: &str) -> Result<Option<Oid>> {
        self.inner.remote_tag_oid(remote, name)
    }

    fn head_commit(&self) -> Result<Oid> {
        match self.pulled_head.get() {
            Some(head) => Ok(head),
            None => self.inner.head_commit(),
        }
    }

    fn tags_pointing_at(&self, commit: Oid) -> Result<Vec<String>> {
        self.inner.tags_pointing_at(commit)
    }

    // Fetching only refreshes the state every later read depends on.
    fn fetch(&self, remote: &str) -> Result<()> {
        self.inner.fetch(remote)
    }

    fn fast_forward_target(&self, remote: &str, branch: &str) -> Result<Option<Oid>> {
        self.inner.fast_forward_target(remote, branch)
    }

    // The reachability check is read-only, so a diverged branch fails here too.
    fn fast_forward(&self, remote: &str, branch: &str) -> Result<()> {
        let target = self.inner.fast_forward_target(remote, branch)?;
        self.report(format!("git pull --ff-only {} {}", remote, branch));
        if target.is_some() {
            self.pulled_head.set(target);
        }
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str, target: Oid) -> Result<Oid> {
        if self.inner.local_tag_oid(name)?.is_some() {
            return Err(ReleaseError::duplicate_local(name));
        }
        self.report(format!("git tag -a {} -m {:?} {}", name, message, target));
        Ok(target)
    }

    fn force_move_tag(&self, name: &str, message: &str, target: Oid) -> Result<Oid> {
        self.report(format!("git tag -a -f {} -m {:?} {}", name, message, target));
        Ok(target)
    }

    fn push_atomic(&self, remote: &str, transaction: &PushTransaction) -> Result<PushOutcome> {
        self.report(format!("git {}", transaction.to_git_args(remote).join(" ")));
        Ok(PushOutcome::Applied)
    }
}
