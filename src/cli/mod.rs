//! Command-line surface and the release workflow behind it

pub mod args;
pub mod orchestration;

pub use args::Args;
pub use orchestration::{run_release_workflow, ReleaseOutcome};
