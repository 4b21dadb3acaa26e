pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod release;
pub mod ui;

pub use error::{ReleaseError, Result};
