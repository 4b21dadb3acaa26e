//! User interface module - operator interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `scripted` - Replayed answers for tests and automation
//! - This module - The [Operator] port and its terminal implementation

use std::io::{self, BufRead, Write};

use console::style;

use crate::error::{ReleaseError, Result};

pub mod formatter;
pub mod scripted;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_dry_run, display_error, display_release_plan,
    display_status, display_success, display_summary,
};
pub use scripted::{Response, ScriptedOperator};

/// Operator answer to a value prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    AcceptDefault,
    Override(String),
}

impl Decision {
    /// The value the operator settled on
    pub fn resolve(self, default: &str) -> String {
        match self {
            Decision::AcceptDefault => default.to_string(),
            Decision::Override(value) => value,
        }
    }
}

/// Human confirmation and override of suggested values
///
/// The release flow holds no lock while waiting on these calls; an
/// implementation may block indefinitely.
pub trait Operator {
    /// Offer `default` for `label`; the operator accepts it or types another value
    fn prompt(&mut self, label: &str, default: &str) -> Result<Decision>;

    /// Ask a yes/no question; anything but an explicit yes declines
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Operator reading answers from standard input
pub struct TerminalOperator<R> {
    input: R,
}

impl TerminalOperator<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        TerminalOperator {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> TerminalOperator<R> {
    pub fn new(input: R) -> Self {
        TerminalOperator { input }
    }

    /// Read one trimmed line. A closed input stream aborts the release.
    fn read_answer(&mut self) -> Result<String> {
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ReleaseError::cancelled("input closed"));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead> Operator for TerminalOperator<R> {
    fn prompt(&mut self, label: &str, default: &str) -> Result<Decision> {
        print!("\n{} [{}]: ", style(label).bold(), style(default).green());
        let answer = self.read_answer()?;

        if answer.is_empty() {
            Ok(Decision::AcceptDefault)
        } else {
            Ok(Decision::Override(answer))
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("\n{} (y/N): ", question);
        let answer = self.read_answer()?.to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_terminal_prompt_accepts_default_on_enter() {
        let mut operator = TerminalOperator::new(Cursor::new("\n"));
        assert_eq!(
            operator.prompt("Major tag", "v1").unwrap(),
            Decision::AcceptDefault
        );
    }

    #[test]
    fn test_terminal_prompt_override() {
        let mut operator = TerminalOperator::new(Cursor::new("  v2  \n"));
        let decision = operator.prompt("Major tag", "v1").unwrap();
        assert_eq!(decision.resolve("v1"), "v2");
    }

    #[test]
    fn test_terminal_confirm() {
        let mut operator = TerminalOperator::new(Cursor::new("Y\nno\n\n"));
        assert!(operator.confirm("Proceed?").unwrap());
        assert!(!operator.confirm("Proceed?").unwrap());
        assert!(!operator.confirm("Proceed?").unwrap());
    }

    #[test]
    fn test_terminal_closed_input_cancels() {
        let mut operator = TerminalOperator::new(Cursor::new(""));
        assert!(matches!(
            operator.confirm("Proceed?"),
            Err(ReleaseError::Cancelled { .. })
        ));
    }
}
