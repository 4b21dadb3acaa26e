//! Domain logic - pure release rules independent of git operations

pub mod tag;
pub mod transaction;
pub mod version;

pub use tag::{Locality, Tag, TagKind};
pub use transaction::{Expectation, PushOutcome, PushTransaction, RefUpdate, Rejection, RemoteRef};
pub use version::VersionTriple;
