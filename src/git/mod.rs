//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the version-control
//! backend, exposing only the reads and writes the release flow needs.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The implementations are:
//!
//! - [repository::Git2Repository]: the real repository, read through `git2`;
//!   the atomic leased push goes through [system::SystemGit]
//! - [dry_run::DryRunRepository]: wraps another backend and reports mutating
//!   commands instead of running them
//! - [mock::MockRepository]: in-memory local and remote state, with the
//!   ability to inject a concurrent remote change right before a push
//!
//! # Usage
//!
//! ```rust
//! # use git_release_tag::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_release_tag::Result<()> {
//! let head = repo.head_commit()?;
//! let at_head = repo.tags_pointing_at(head)?;
//! let lease = repo.remote_tag_oid("upstream", "v1")?;
//! # Ok(())
//! # }
//! ```

pub mod dry_run;
pub mod mock;
pub mod repository;
pub mod system;

pub use dry_run::DryRunRepository;
pub use mock::MockRepository;
pub use repository::Git2Repository;
pub use system::SystemGit;

use crate::domain::{PushOutcome, PushTransaction};
use crate::error::Result;
use git2::Oid;

/// Version-control backend used by the release flow
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map missing
/// remotes to [crate::error::ReleaseError::RemoteNotFound] and undeterminable
/// default branches to [crate::error::ReleaseError::DefaultBranchUnknown].
///
/// ## Tag values
///
/// A tag's *value* is what its reference stores (the annotated tag object);
/// its *target* is the commit it peels to. Leases compare values.
pub trait Repository {
    /// Whether tracked files have no staged or unstaged modifications.
    /// Untracked files are ignored.
    fn is_working_tree_clean(&self) -> Result<bool>;

    /// Name of the branch the remote's HEAD points at (e.g. "main")
    fn detect_default_branch(&self, remote: &str) -> Result<String>;

    /// Currently checked-out branch, or `None` for a detached or unborn HEAD
    fn current_branch(&self) -> Result<Option<String>>;

    /// Local tag names matching a glob pattern (e.g. "v*"), sorted by name
    fn list_tags(&self, pattern: &str) -> Result<Vec<String>>;

    /// Value of a local tag reference, or `None` if the tag does not exist
    fn local_tag_oid(&self, name: &str) -> Result<Option<Oid>>;

    /// Commit a local tag peels to, or `None` if the tag does not exist
    fn tag_target(&self, name: &str) -> Result<Option<Oid>>;

    /// Value of `refs/tags/<name>` as currently advertised by the remote
    ///
    /// This is the lease baseline: it must be read from the remote, never
    /// assumed from local state.
    fn remote_tag_oid(&self, remote: &str, name: &str) -> Result<Option<Oid>>;

    /// Commit HEAD points at
    fn head_commit(&self) -> Result<Oid>;

    /// Local tag names whose target is exactly `commit`
    fn tags_pointing_at(&self, commit: Oid) -> Result<Vec<String>>;

    /// Update remote-tracking branches and tags from the remote
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Commit `branch` would move to when fast-forwarded to `<remote>/<branch>`
    ///
    /// `None` when there is nothing to pull. Fails with `NotFastForward` if
    /// the branches have diverged. Never writes.
    fn fast_forward_target(&self, remote: &str, branch: &str) -> Result<Option<Oid>>;

    /// Fast-forward the checked-out `branch` to `<remote>/<branch>`
    fn fast_forward(&self, remote: &str, branch: &str) -> Result<()>;

    /// Create an annotated tag; fails with `DuplicateTag` if it exists locally.
    /// Returns the new tag object's id.
    fn create_annotated_tag(&self, name: &str, message: &str, target: Oid) -> Result<Oid>;

    /// Create or overwrite an annotated tag. Returns the new tag object's id.
    fn force_move_tag(&self, name: &str, message: &str, target: Oid) -> Result<Oid>;

    /// Submit every update of `transaction` to `remote` as one atomic push
    fn push_atomic(&self, remote: &str, transaction: &PushTransaction) -> Result<PushOutcome>;
}

/// Abbreviated commit id for display
pub fn short_oid(oid: Oid) -> String {
    let full = oid.to_string();
    full[..7].to_string()
}
