use std::fmt;

use git2::Oid;
use thiserror::Error;

/// Where a duplicate tag was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagLocation {
    Local,
    Remote(String),
}

impl fmt::Display for TagLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagLocation::Local => write!(f, "locally"),
            TagLocation::Remote(remote) => write!(f, "on remote '{}'", remote),
        }
    }
}

/// Coarse classification of a [ReleaseError], used for exit codes and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Precondition,
    Validation,
    DuplicateTag,
    ConcurrentModification,
    Cancelled,
    Backend,
}

/// Unified error type for release tagging operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Working tree has uncommitted changes; commit or stash them before releasing")]
    DirtyWorkingTree,

    #[error("Remote '{remote}' not found")]
    RemoteNotFound { remote: String },

    #[error("Cannot determine the default branch of remote '{remote}'")]
    DefaultBranchUnknown { remote: String },

    #[error("HEAD does not point at a commit")]
    HeadUnborn,

    #[error("Branch '{branch}' cannot be fast-forwarded to '{remote}/{branch}'")]
    NotFastForward { remote: String, branch: String },

    #[error("Invalid major tag '{value}': expected v<MAJOR> (e.g. v1)")]
    InvalidMajorTag { value: String },

    #[error("Invalid semver tag '{value}': expected v<MAJOR>.<MINOR>.<PATCH> (e.g. v1.2.3)")]
    InvalidSemverTag { value: String },

    #[error("Tag '{tag}' already exists {location}")]
    DuplicateTag { tag: String, location: TagLocation },

    #[error(
        "Tag '{tag}' on remote '{remote}' changed during the release \
         (expected {expected}, observed {observed}); fetch and run the release again"
    )]
    ConcurrentModification {
        remote: String,
        tag: String,
        expected: String,
        observed: String,
    },

    #[error("Cancelled: {reason}")]
    Cancelled { reason: String },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command `{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results in git-release-tag
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a cancellation caused by an operator decline
    pub fn cancelled(reason: impl Into<String>) -> Self {
        ReleaseError::Cancelled {
            reason: reason.into(),
        }
    }

    /// Create a failed external command error
    pub fn command(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        ReleaseError::Command {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn duplicate_local(tag: impl Into<String>) -> Self {
        ReleaseError::DuplicateTag {
            tag: tag.into(),
            location: TagLocation::Local,
        }
    }

    pub fn duplicate_remote(tag: impl Into<String>, remote: impl Into<String>) -> Self {
        ReleaseError::DuplicateTag {
            tag: tag.into(),
            location: TagLocation::Remote(remote.into()),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ReleaseError::DirtyWorkingTree
            | ReleaseError::RemoteNotFound { .. }
            | ReleaseError::DefaultBranchUnknown { .. }
            | ReleaseError::HeadUnborn
            | ReleaseError::NotFastForward { .. } => ErrorCategory::Precondition,
            ReleaseError::InvalidMajorTag { .. } | ReleaseError::InvalidSemverTag { .. } => {
                ErrorCategory::Validation
            }
            ReleaseError::DuplicateTag { .. } => ErrorCategory::DuplicateTag,
            ReleaseError::ConcurrentModification { .. } => ErrorCategory::ConcurrentModification,
            ReleaseError::Cancelled { .. } => ErrorCategory::Cancelled,
            ReleaseError::Git(_)
            | ReleaseError::Io(_)
            | ReleaseError::Command { .. }
            | ReleaseError::Config(_) => ErrorCategory::Backend,
        }
    }

    /// Process exit status for this error. Operator cancellation is 130, everything else 1.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Cancelled => 130,
            _ => 1,
        }
    }
}

/// Render an optional object id for error messages
pub fn describe_oid(oid: Option<Oid>) -> String {
    match oid {
        Some(oid) => oid.to_string(),
        None => "<absent>".to_string(),
    }
}
