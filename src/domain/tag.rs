use git2::Oid;

use crate::domain::version::{self, VersionTriple};
use crate::error::{ReleaseError, Result};

/// Which grammar a tag name follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `vMAJOR.MINOR.PATCH`, immutable once published
    Semver,
    /// `vMAJOR`, a floating alias moved on every release
    Major,
}

impl TagKind {
    /// Classify a tag name, or `None` if it matches neither grammar
    pub fn of(name: &str) -> Option<TagKind> {
        if version::is_semver_tag(name) {
            Some(TagKind::Semver)
        } else if version::is_major_tag(name) {
            Some(TagKind::Major)
        } else {
            None
        }
    }
}

/// Where a tag currently exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    Local,
    Remote,
    Both,
    None,
}

/// A release tag moving through suggestion, local creation and publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub kind: TagKind,
    pub target: Oid,
    pub message: String,
    pub locality: Locality,
}

impl Tag {
    /// Build a not-yet-materialized semver tag, validating its name
    pub fn semver(name: impl Into<String>, target: Oid, message: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_semver(&name)?;
        Ok(Tag {
            name,
            kind: TagKind::Semver,
            target,
            message: message.into(),
            locality: Locality::None,
        })
    }

    /// Build a not-yet-materialized major alias tag, validating its name
    pub fn major(name: impl Into<String>, target: Oid, message: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_major(&name)?;
        Ok(Tag {
            name,
            kind: TagKind::Major,
            target,
            message: message.into(),
            locality: Locality::None,
        })
    }

    /// Fully qualified reference name (`refs/tags/<name>`)
    pub fn ref_name(&self) -> String {
        tag_ref(&self.name)
    }

    pub fn is_mutable(&self) -> bool {
        self.kind == TagKind::Major
    }
}

/// Fully qualified reference name for a tag
pub fn tag_ref(name: &str) -> String {
    format!("refs/tags/{}", name)
}

/// Validate operator input for the major alias prompt
pub fn validate_major(value: &str) -> Result<u64> {
    version::parse_major(value).ok_or_else(|| ReleaseError::InvalidMajorTag {
        value: value.to_string(),
    })
}

/// Validate operator input for the semver prompt
pub fn validate_semver(value: &str) -> Result<VersionTriple> {
    version::parse(value).ok_or_else(|| ReleaseError::InvalidSemverTag {
        value: value.to_string(),
    })
}
