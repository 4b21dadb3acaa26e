use std::fmt;

/// Non-fatal conditions met during a release that the operator should see.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The default branch is not checked out, so it was not fast-forwarded
    FastForwardSkipped {
        default_branch: String,
        current_branch: Option<String>,
    },
    /// The semver tag's major component differs from the chosen major tag
    MajorComponentMismatch { semver: String, major: String },
    /// The major tag already exists locally and will be moved
    MajorTagExists {
        major: String,
        current_commit_hash: String,
    },
    /// `v*` tags that match neither release grammar and were not considered
    IgnoredMalformedTags { tags: Vec<String> },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::FastForwardSkipped {
                default_branch,
                current_branch,
            } => {
                let current = current_branch.as_deref().unwrap_or("detached HEAD");
                write!(
                    f,
                    "Not pulling '{}': currently on '{}'",
                    default_branch, current
                )
            }
            BoundaryWarning::MajorComponentMismatch { semver, major } => {
                write!(
                    f,
                    "Semver tag '{}' does not belong to major tag '{}'",
                    semver, major
                )
            }
            BoundaryWarning::MajorTagExists {
                major,
                current_commit_hash,
            } => {
                let short_hash = if current_commit_hash.len() > 7 {
                    &current_commit_hash[..7]
                } else {
                    current_commit_hash.as_str()
                };
                write!(
                    f,
                    "Major tag '{}' already exists (currently at {}) and will be moved",
                    major, short_hash
                )
            }
            BoundaryWarning::IgnoredMalformedTags { tags } => {
                write!(
                    f,
                    "Ignoring {} tag(s) that are not vX or vX.Y.Z: {}",
                    tags.len(),
                    tags.join(", ")
                )
            }
        }
    }
}
