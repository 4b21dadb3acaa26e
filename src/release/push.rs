//! Atomic dual-tag publication
//!
//! The semver tag is created and the major alias is compare-and-swapped in
//! one atomic push. The major alias update carries a lease: the remote value
//! observed right before the push. If another process moved the alias in the
//! meantime the remote rejects the whole transaction, semver tag included.
//!
//! No client-side lock is held across operator prompts and no automatic
//! retry is attempted; a rejected push leaves the local tags in place for the
//! operator to inspect.

use crate::domain::tag::tag_ref;
use crate::domain::{Locality, PushOutcome, PushTransaction, Rejection, RemoteRef, Tag};
use crate::error::{describe_oid, ReleaseError, Result};
use crate::git::Repository;

/// Both tags after a successful publication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub semver: Tag,
    pub major: Tag,
    /// Lease the major alias update was guarded by
    pub lease: RemoteRef,
}

pub struct DualPushCoordinator<'a, R: Repository> {
    repo: &'a R,
    remote: &'a str,
}

impl<'a, R: Repository> DualPushCoordinator<'a, R> {
    pub fn new(repo: &'a R, remote: &'a str) -> Self {
        DualPushCoordinator { repo, remote }
    }

    /// Observe the remote value of the major alias as the lease baseline
    pub fn read_lease(&self, major_tag: &str) -> Result<RemoteRef> {
        let observed = self.repo.remote_tag_oid(self.remote, major_tag)?;
        tracing::info!(
            remote = self.remote,
            tag = major_tag,
            lease = %describe_oid(observed),
            "captured lease for major tag"
        );
        Ok(RemoteRef {
            name: tag_ref(major_tag),
            expected_old_value: observed,
        })
    }

    /// Build the two-update transaction: create the semver tag, lease-update
    /// the major alias
    pub fn transaction(&self, semver: &Tag, lease: &RemoteRef) -> PushTransaction {
        PushTransaction::new().create(semver.ref_name()).lease(lease)
    }

    /// Publish both tags in one atomic push
    ///
    /// # Errors
    /// * `DuplicateTag` - the semver tag already exists on the remote
    /// * `ConcurrentModification` - the major alias moved after the lease was read
    pub fn publish(&self, semver: &Tag, major: &Tag) -> Result<PublishedRelease> {
        if self.repo.remote_tag_oid(self.remote, &semver.name)?.is_some() {
            return Err(ReleaseError::duplicate_remote(&semver.name, self.remote));
        }

        let lease = self.read_lease(&major.name)?;
        let transaction = self.transaction(semver, &lease);

        match self.repo.push_atomic(self.remote, &transaction)? {
            PushOutcome::Applied => {
                tracing::info!(
                    remote = self.remote,
                    semver = %semver.name,
                    major = %major.name,
                    "published release tags"
                );
                Ok(PublishedRelease {
                    semver: Tag {
                        locality: Locality::Both,
                        ..semver.clone()
                    },
                    major: Tag {
                        locality: Locality::Both,
                        ..major.clone()
                    },
                    lease,
                })
            }
            PushOutcome::Rejected(rejections) => Err(self.rejection_error(semver, major, rejections)),
        }
    }

    fn rejection_error(&self, semver: &Tag, major: &Tag, rejections: Vec<Rejection>) -> ReleaseError {
        tracing::warn!(remote = self.remote, ?rejections, "atomic push rejected");

        if rejections
            .iter()
            .any(|r| matches!(r, Rejection::AlreadyExists { .. }))
        {
            return ReleaseError::duplicate_remote(&semver.name, self.remote);
        }

        if let Some(expected) = rejections.iter().find_map(|r| match r {
            Rejection::StaleLease { expected, .. } => Some(*expected),
            _ => None,
        }) {
            let observed = match self.repo.remote_tag_oid(self.remote, &major.name) {
                Ok(observed) => describe_oid(observed),
                Err(e) => format!("<unreadable: {}>", e),
            };
            return ReleaseError::ConcurrentModification {
                remote: self.remote.to_string(),
                tag: major.name.clone(),
                expected: describe_oid(expected),
                observed,
            };
        }

        let reasons: Vec<String> = rejections
            .iter()
            .map(|r| match r {
                Rejection::Other { reference, reason } => format!("{}: {}", reference, reason),
                other => format!("{:?}", other),
            })
            .collect();
        ReleaseError::command(
            format!("git push --atomic {}", self.remote),
            reasons.join("; "),
        )
    }
}
