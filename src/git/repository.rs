use std::path::Path;

use git2::{
    build::CheckoutBuilder, BranchType, Direction, ErrorCode, Oid, Remote, RemoteCallbacks,
    Repository as Git2Repo, StatusOptions,
};

use crate::domain::tag::tag_ref;
use crate::domain::{PushOutcome, PushTransaction};
use crate::error::{ReleaseError, Result};
use crate::git::system::SystemGit;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    system: SystemGit,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        Git2Repository {
            repo,
            system: SystemGit::new(root),
        }
    }

    fn find_remote(&self, remote: &str) -> Result<Remote<'_>> {
        self.repo.find_remote(remote).map_err(|e| match e.code() {
            ErrorCode::NotFound | ErrorCode::InvalidSpec => ReleaseError::RemoteNotFound {
                remote: remote.to_string(),
            },
            _ => ReleaseError::Git(e),
        })
    }

    /// Read the default branch recorded by `refs/remotes/<remote>/HEAD`
    fn local_remote_head(&self, remote: &str) -> Option<String> {
        let reference = self
            .repo
            .find_reference(&format!("refs/remotes/{}/HEAD", remote))
            .ok()?;
        let target = reference.symbolic_target()?;
        target
            .strip_prefix(&format!("refs/remotes/{}/", remote))
            .map(str::to_string)
    }

    fn find_tag_reference(&self, name: &str) -> Result<Option<git2::Reference<'_>>> {
        match self.repo.find_reference(&tag_ref(name)) {
            Ok(reference) => Ok(Some(reference)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_tag(&self, name: &str, message: &str, target: Oid, force: bool) -> Result<Oid> {
        let object = self.repo.find_object(target, None)?;
        let signature = self.repo.signature()?;

        self.repo
            .tag(name, &object, &signature, message, force)
            .map_err(|e| match e.code() {
                ErrorCode::Exists => ReleaseError::duplicate_local(name),
                _ => ReleaseError::Git(e),
            })
    }
}

/// Credential callbacks for remote operations.
///
/// Tries SSH keys from ~/.ssh/, then the SSH agent, then default credentials.
fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}

impl super::Repository for Git2Repository {
    fn is_working_tree_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.is_empty())
    }

    fn detect_default_branch(&self, remote: &str) -> Result<String> {
        let mut handle = self.find_remote(remote)?;

        match handle.connect_auth(Direction::Fetch, Some(remote_callbacks()), None) {
            Ok(connection) => {
                if let Ok(head) = connection.default_branch() {
                    if let Some(branch) = head.as_str().and_then(|h| h.strip_prefix("refs/heads/")) {
                        return Ok(branch.to_string());
                    }
                }
            }
            Err(e) => {
                tracing::debug!(remote, error = %e, "could not query remote HEAD, using local record");
            }
        }

        self.local_remote_head(remote)
            .ok_or_else(|| ReleaseError::DefaultBranchUnknown {
                remote: remote.to_string(),
            })
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(str::to_string))
    }

    fn list_tags(&self, pattern: &str) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(Some(pattern))?;
        let mut names: Vec<String> = tags.iter().flatten().map(str::to_string).collect();
        names.sort();
        Ok(names)
    }

    fn local_tag_oid(&self, name: &str) -> Result<Option<Oid>> {
        Ok(self
            .find_tag_reference(name)?
            .and_then(|reference| reference.target()))
    }

    fn tag_target(&self, name: &str) -> Result<Option<Oid>> {
        match self.find_tag_reference(name)? {
            Some(reference) => Ok(Some(reference.peel_to_commit()?.id())),
            None => Ok(None),
        }
    }

    fn remote_tag_oid(&self, remote: &str, name: &str) -> Result<Option<Oid>> {
        let mut handle = self.find_remote(remote)?;
        let connection = handle.connect_auth(Direction::Fetch, Some(remote_callbacks()), None)?;

        let wanted = tag_ref(name);
        let oid = connection
            .list()?
            .iter()
            .find(|head| head.name() == wanted)
            .map(|head| head.oid());

        tracing::debug!(remote, tag = name, oid = ?oid, "read remote tag");
        Ok(oid)
    }

    fn head_commit(&self) -> Result<Oid> {
        let head = self.repo.head().map_err(|e| match e.code() {
            ErrorCode::UnbornBranch | ErrorCode::NotFound => ReleaseError::HeadUnborn,
            _ => ReleaseError::Git(e),
        })?;
        Ok(head.peel_to_commit()?.id())
    }

    fn tags_pointing_at(&self, commit: Oid) -> Result<Vec<String>> {
        let mut matching = Vec::new();

        for name in self.repo.tag_names(None)?.iter().flatten() {
            let Some(reference) = self.find_tag_reference(name)? else {
                continue;
            };
            // Tags on non-commit objects cannot point at a commit
            if let Ok(target) = reference.peel_to_commit() {
                if target.id() == commit {
                    matching.push(name.to_string());
                }
            }
        }

        matching.sort();
        Ok(matching)
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        let mut handle = self.find_remote(remote)?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks());

        let refspec_heads = format!("+refs/heads/*:refs/remotes/{}/*", remote);
        let refspecs = [refspec_heads.as_str(), "+refs/tags/*:refs/tags/*"];

        tracing::debug!(remote, "fetching branches and tags");
        handle
            .fetch(&refspecs, Some(&mut fetch_options), None)
            .map_err(|e| {
                ReleaseError::command(format!("git fetch {} --tags", remote), e.message())
            })?;

        Ok(())
    }

    fn fast_forward_target(&self, remote: &str, branch: &str) -> Result<Option<Oid>> {
        let tracking = format!("refs/remotes/{}/{}", remote, branch);
        let remote_oid = match self.repo.find_reference(&tracking) {
            Ok(reference) => reference.peel_to_commit()?.id(),
            // Nothing upstream to fast-forward to
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let local_oid = self
            .repo
            .find_branch(branch, BranchType::Local)?
            .get()
            .peel_to_commit()?
            .id();

        if local_oid == remote_oid || self.repo.graph_descendant_of(local_oid, remote_oid)? {
            return Ok(None);
        }

        if !self.repo.graph_descendant_of(remote_oid, local_oid)? {
            return Err(ReleaseError::NotFastForward {
                remote: remote.to_string(),
                branch: branch.to_string(),
            });
        }

        Ok(Some(remote_oid))
    }

    fn fast_forward(&self, remote: &str, branch: &str) -> Result<()> {
        let Some(remote_oid) = self.fast_forward_target(remote, branch)? else {
            return Ok(());
        };

        let mut local_ref = self
            .repo
            .find_branch(branch, BranchType::Local)?
            .into_reference();
        let target = self.repo.find_object(remote_oid, None)?;
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        local_ref.set_target(
            remote_oid,
            &format!("fast-forward {} to {}/{}", branch, remote, branch),
        )?;

        tracing::info!(branch, remote, commit = %remote_oid, "fast-forwarded branch");
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str, target: Oid) -> Result<Oid> {
        if self.local_tag_oid(name)?.is_some() {
            return Err(ReleaseError::duplicate_local(name));
        }
        self.write_tag(name, message, target, false)
    }

    fn force_move_tag(&self, name: &str, message: &str, target: Oid) -> Result<Oid> {
        self.write_tag(name, message, target, true)
    }

    fn push_atomic(&self, remote: &str, transaction: &PushTransaction) -> Result<PushOutcome> {
        self.find_remote(remote)?;
        self.system.push_atomic(remote, transaction)
    }
}
