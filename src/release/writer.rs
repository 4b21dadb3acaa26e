use crate::domain::{Locality, Tag};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;

/// Materializes release tags in the local repository
///
/// Only local state is touched here; remote protection of the major alias
/// happens when the tags are pushed.
pub struct TagWriter<'a, R: Repository> {
    repo: &'a R,
}

impl<'a, R: Repository> TagWriter<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        TagWriter { repo }
    }

    /// Create the immutable semver tag. Fails with `DuplicateTag` if a tag
    /// of that name already exists locally.
    pub fn create_annotated(&self, tag: &Tag) -> Result<Tag> {
        if tag.is_mutable() {
            return Err(ReleaseError::InvalidSemverTag {
                value: tag.name.clone(),
            });
        }

        self.repo
            .create_annotated_tag(&tag.name, &tag.message, tag.target)?;
        tracing::info!(tag = %tag.name, target = %tag.target, "created semver tag");

        Ok(Tag {
            locality: Locality::Local,
            ..tag.clone()
        })
    }

    /// Create or overwrite the major alias tag
    pub fn force_move(&self, tag: &Tag) -> Result<Tag> {
        if !tag.is_mutable() {
            return Err(ReleaseError::InvalidMajorTag {
                value: tag.name.clone(),
            });
        }

        let previous = self.repo.tag_target(&tag.name)?;
        self.repo
            .force_move_tag(&tag.name, &tag.message, tag.target)?;
        tracing::info!(tag = %tag.name, from = ?previous, to = %tag.target, "moved major tag");

        Ok(Tag {
            locality: Locality::Local,
            ..tag.clone()
        })
    }
}
