//! Local tag materialization and remote publication

pub mod push;
pub mod writer;

pub use push::{DualPushCoordinator, PublishedRelease};
pub use writer::TagWriter;
