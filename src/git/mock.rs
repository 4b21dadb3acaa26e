use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use git2::Oid;

use crate::domain::{Expectation, PushOutcome, PushTransaction, Rejection};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;

const TAG_PREFIX: &str = "refs/tags/";

/// Annotated tag object
#[derive(Debug, Clone)]
struct TagObject {
    target: Oid,
    message: String,
}

/// Tag and HEAD state of a mock remote
#[derive(Debug, Clone, Default)]
struct MockRemote {
    default_branch: Option<String>,
    tags: BTreeMap<String, Oid>,
}

/// A remote change applied when the next push arrives, standing in for
/// another release process racing this one
#[derive(Debug, Clone)]
struct PendingRace {
    remote: String,
    tag: String,
    target: Option<Oid>,
}

/// Mock repository for testing without actual git operations
///
/// Local tags and remote tags share one object store so tag values compare
/// the same way they would against a real remote.
pub struct MockRepository {
    head: Cell<Option<Oid>>,
    upstream_ahead: Option<Oid>,
    current_branch: Option<String>,
    clean: bool,
    diverged: bool,
    local_tags: RefCell<BTreeMap<String, Oid>>,
    objects: RefCell<HashMap<Oid, TagObject>>,
    remotes: RefCell<HashMap<String, MockRemote>>,
    races: RefCell<Vec<PendingRace>>,
    next_object: Cell<u32>,
    calls: RefCell<Vec<String>>,
    push_attempts: Cell<usize>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            head: Cell::new(None),
            upstream_ahead: None,
            current_branch: None,
            clean: true,
            diverged: false,
            local_tags: RefCell::new(BTreeMap::new()),
            objects: RefCell::new(HashMap::new()),
            remotes: RefCell::new(HashMap::new()),
            races: RefCell::new(Vec::new()),
            next_object: Cell::new(0),
            calls: RefCell::new(Vec::new()),
            push_attempts: Cell::new(0),
        }
    }

    /// Set the commit HEAD points at
    pub fn set_head(&mut self, oid: Oid) {
        self.head.set(Some(oid));
    }

    /// Put the remote-tracking branch one fast-forward ahead of HEAD
    pub fn set_upstream_ahead(&mut self, oid: Oid) {
        self.upstream_ahead = Some(oid);
    }

    /// Set the checked-out branch
    pub fn set_current_branch(&mut self, branch: impl Into<String>) {
        self.current_branch = Some(branch.into());
    }

    pub fn set_clean(&mut self, clean: bool) {
        self.clean = clean;
    }

    /// Make the local branch impossible to fast-forward
    pub fn set_diverged(&mut self, diverged: bool) {
        self.diverged = diverged;
    }

    /// Register a remote and the branch its HEAD points at
    pub fn add_remote(&mut self, name: impl Into<String>, default_branch: Option<&str>) {
        self.remotes.borrow_mut().insert(
            name.into(),
            MockRemote {
                default_branch: default_branch.map(str::to_string),
                tags: BTreeMap::new(),
            },
        );
    }

    /// Add an annotated local tag pointing at a commit
    pub fn add_tag(&mut self, name: impl Into<String>, target: Oid) {
        let name = name.into();
        let object = self.new_object(target, format!("Release {}", name));
        self.local_tags.borrow_mut().insert(name, object);
    }

    /// Add an annotated tag to a remote only
    pub fn add_remote_tag(&mut self, remote: &str, name: impl Into<String>, target: Oid) {
        let name = name.into();
        let object = self.new_object(target, format!("Release {}", name));
        self.remotes
            .borrow_mut()
            .entry(remote.to_string())
            .or_default()
            .tags
            .insert(name, object);
    }

    /// Add a tag both locally and on a remote with the same value
    pub fn add_published_tag(&mut self, remote: &str, name: impl Into<String>, target: Oid) {
        let name = name.into();
        let object = self.new_object(target, format!("Release {}", name));
        self.local_tags.borrow_mut().insert(name.clone(), object);
        self.remotes
            .borrow_mut()
            .entry(remote.to_string())
            .or_default()
            .tags
            .insert(name, object);
    }

    /// Schedule a concurrent change of a remote tag, applied when the next
    /// push is submitted (after any lease was read). `None` deletes the tag.
    pub fn race_on_push(&self, remote: &str, tag: &str, target: Option<Oid>) {
        self.races.borrow_mut().push(PendingRace {
            remote: remote.to_string(),
            tag: tag.to_string(),
            target,
        });
    }

    /// Commit a remote tag peels to
    pub fn remote_tag_target(&self, remote: &str, name: &str) -> Option<Oid> {
        let value = self.remote_tag_value(remote, name)?;
        Some(self.peel(value))
    }

    /// Raw value of a remote tag reference
    pub fn remote_tag_value(&self, remote: &str, name: &str) -> Option<Oid> {
        self.remotes
            .borrow()
            .get(remote)
            .and_then(|r| r.tags.get(name).copied())
    }

    /// Message of a local annotated tag
    pub fn tag_message(&self, name: &str) -> Option<String> {
        let value = *self.local_tags.borrow().get(name)?;
        self.objects.borrow().get(&value).map(|o| o.message.clone())
    }

    /// Mutating operations performed so far, as git commands
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn push_attempts(&self) -> usize {
        self.push_attempts.get()
    }

    fn new_object(&self, target: Oid, message: String) -> Oid {
        let counter = self.next_object.get() + 1;
        self.next_object.set(counter);

        let mut bytes = [0xa7u8; 20];
        bytes[16..].copy_from_slice(&counter.to_be_bytes());
        let oid = Oid::from_bytes(&bytes).unwrap_or_else(|_| Oid::zero());

        self.objects
            .borrow_mut()
            .insert(oid, TagObject { target, message });
        oid
    }

    fn peel(&self, value: Oid) -> Oid {
        self.objects
            .borrow()
            .get(&value)
            .map(|object| object.target)
            .unwrap_or(value)
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn require_remote(&self, remote: &str) -> Result<()> {
        if self.remotes.borrow().contains_key(remote) {
            Ok(())
        } else {
            Err(ReleaseError::RemoteNotFound {
                remote: remote.to_string(),
            })
        }
    }

    fn apply_races(&self) {
        let races: Vec<PendingRace> = self.races.borrow_mut().drain(..).collect();
        for race in races {
            let value = race
                .target
                .map(|target| self.new_object(target, format!("Moved {}", race.tag)));

            let mut remotes = self.remotes.borrow_mut();
            let tags = &mut remotes.entry(race.remote).or_default().tags;
            match value {
                Some(value) => {
                    tags.insert(race.tag, value);
                }
                None => {
                    tags.remove(&race.tag);
                }
            }
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn is_working_tree_clean(&self) -> Result<bool> {
        Ok(self.clean)
    }

    fn detect_default_branch(&self, remote: &str) -> Result<String> {
        let remotes = self.remotes.borrow();
        let entry = remotes.get(remote).ok_or_else(|| ReleaseError::RemoteNotFound {
            remote: remote.to_string(),
        })?;
        entry
            .default_branch
            .clone()
            .ok_or_else(|| ReleaseError::DefaultBranchUnknown {
                remote: remote.to_string(),
            })
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.current_branch.clone())
    }

    fn list_tags(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = glob::Pattern::new(pattern)
            .map_err(|e| ReleaseError::config(format!("Invalid tag pattern '{}': {}", pattern, e)))?;
        Ok(self
            .local_tags
            .borrow()
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect())
    }

    fn local_tag_oid(&self, name: &str) -> Result<Option<Oid>> {
        Ok(self.local_tags.borrow().get(name).copied())
    }

    fn tag_target(&self, name: &str) -> Result<Option<Oid>> {
        let value = self.local_tags.borrow().get(name).copied();
        Ok(value.map(|value| self.peel(value)))
    }

    fn remote_tag_oid(&self, remote: &str, name: &str) -> Result<Option<Oid>> {
        self.require_remote(remote)?;
        Ok(self.remote_tag_value(remote, name))
    }

    fn head_commit(&self) -> Result<Oid> {
        self.head.get().ok_or(ReleaseError::HeadUnborn)
    }

    fn tags_pointing_at(&self, commit: Oid) -> Result<Vec<String>> {
        let tags = self.local_tags.borrow();
        Ok(tags
            .iter()
            .filter(|(_, value)| self.peel(**value) == commit)
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        self.require_remote(remote)?;
        let remote_tags = self.remotes.borrow()[remote].tags.clone();
        self.local_tags.borrow_mut().extend(remote_tags);
        Ok(())
    }

    fn fast_forward_target(&self, remote: &str, branch: &str) -> Result<Option<Oid>> {
        self.require_remote(remote)?;
        if self.diverged {
            return Err(ReleaseError::NotFastForward {
                remote: remote.to_string(),
                branch: branch.to_string(),
            });
        }
        Ok(self.upstream_ahead.filter(|ahead| Some(*ahead) != self.head.get()))
    }

    fn fast_forward(&self, remote: &str, branch: &str) -> Result<()> {
        if let Some(target) = self.fast_forward_target(remote, branch)? {
            self.head.set(Some(target));
        }
        self.record(format!("git pull --ff-only {} {}", remote, branch));
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str, target: Oid) -> Result<Oid> {
        if self.local_tags.borrow().contains_key(name) {
            return Err(ReleaseError::duplicate_local(name));
        }
        let object = self.new_object(target, message.to_string());
        self.local_tags.borrow_mut().insert(name.to_string(), object);
        self.record(format!("git tag -a {} {}", name, target));
        Ok(object)
    }

    fn force_move_tag(&self, name: &str, message: &str, target: Oid) -> Result<Oid> {
        let object = self.new_object(target, message.to_string());
        self.local_tags.borrow_mut().insert(name.to_string(), object);
        self.record(format!("git tag -a -f {} {}", name, target));
        Ok(object)
    }

    fn push_atomic(&self, remote: &str, transaction: &PushTransaction) -> Result<PushOutcome> {
        self.require_remote(remote)?;
        self.push_attempts.set(self.push_attempts.get() + 1);
        self.apply_races();

        let local_tags = self.local_tags.borrow();
        let mut remotes = self.remotes.borrow_mut();
        let remote_tags = &mut remotes
            .get_mut(remote)
            .ok_or_else(|| ReleaseError::RemoteNotFound {
                remote: remote.to_string(),
            })?
            .tags;

        let mut staged = Vec::new();
        let mut rejections = Vec::new();

        for update in transaction.updates() {
            let source = update.source.trim_start_matches(TAG_PREFIX);
            let destination = update.destination.trim_start_matches(TAG_PREFIX);
            let current = remote_tags.get(destination).copied();

            let Some(value) = local_tags.get(source).copied() else {
                rejections.push(Rejection::Other {
                    reference: update.destination.clone(),
                    reason: format!("src refspec {} does not match any", update.source),
                });
                continue;
            };

            match update.expectation {
                Expectation::Create if current.is_some() => {
                    rejections.push(Rejection::AlreadyExists {
                        reference: update.destination.clone(),
                    });
                }
                Expectation::Lease(expected) if current != expected => {
                    rejections.push(Rejection::StaleLease {
                        reference: update.destination.clone(),
                        expected,
                    });
                }
                _ => staged.push((destination.to_string(), value)),
            }
        }

        if !rejections.is_empty() {
            return Ok(PushOutcome::Rejected(rejections));
        }

        remote_tags.extend(staged);
        drop(remotes);
        drop(local_tags);
        self.record(format!("git {}", transaction.to_git_args(remote).join(" ")));
        Ok(PushOutcome::Applied)
    }
}
