//! Push transaction model
//!
//! A [PushTransaction] is an ordered set of reference updates that the
//! backend applies atomically: either every update lands on the remote or
//! none does.

use git2::Oid;

/// Condition a remote reference must satisfy for its update to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Plain create: rejected if the remote reference already exists
    Create,
    /// Compare-and-swap: the remote value must equal the lease baseline,
    /// where `None` means the reference must not exist
    Lease(Option<Oid>),
}

/// One reference update within a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    /// Local reference whose value is sent
    pub source: String,
    /// Remote reference being written
    pub destination: String,
    pub expectation: Expectation,
}

impl RefUpdate {
    pub fn refspec(&self) -> String {
        format!("{}:{}", self.source, self.destination)
    }
}

/// Lease baseline for a remote reference, captured immediately before a push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub name: String,
    pub expected_old_value: Option<Oid>,
}

/// Ordered set of reference updates applied all-or-nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushTransaction {
    updates: Vec<RefUpdate>,
}

impl PushTransaction {
    pub fn new() -> Self {
        PushTransaction::default()
    }

    /// Add a create-only update of `reference` (same name locally and remotely)
    pub fn create(mut self, reference: impl Into<String>) -> Self {
        let reference = reference.into();
        self.updates.push(RefUpdate {
            source: reference.clone(),
            destination: reference,
            expectation: Expectation::Create,
        });
        self
    }

    /// Add a leased update of `lease.name` guarded by its observed value
    pub fn lease(mut self, lease: &RemoteRef) -> Self {
        self.updates.push(RefUpdate {
            source: lease.name.clone(),
            destination: lease.name.clone(),
            expectation: Expectation::Lease(lease.expected_old_value),
        });
        self
    }

    pub fn updates(&self) -> &[RefUpdate] {
        &self.updates
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Arguments for a single atomic `git push` of this transaction
    pub fn to_git_args(&self, remote: &str) -> Vec<String> {
        let mut args = vec![
            "push".to_string(),
            "--atomic".to_string(),
            "--porcelain".to_string(),
        ];

        for update in &self.updates {
            if let Expectation::Lease(expected) = update.expectation {
                let expected = expected.map(|oid| oid.to_string()).unwrap_or_default();
                args.push(format!(
                    "--force-with-lease={}:{}",
                    update.destination, expected
                ));
            }
        }

        args.push(remote.to_string());
        args.extend(self.updates.iter().map(RefUpdate::refspec));
        args
    }
}

/// Why the backend refused a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A create-only reference already exists on the remote
    AlreadyExists { reference: String },
    /// A leased reference no longer holds the expected value
    StaleLease {
        reference: String,
        expected: Option<Oid>,
    },
    /// Any other refusal reported by the remote
    Other { reference: String, reason: String },
}

/// Result of submitting a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Applied,
    Rejected(Vec<Rejection>),
}
