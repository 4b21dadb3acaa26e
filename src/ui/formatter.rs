//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use console::style;

use crate::boundary::BoundaryWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Echo a command that a dry run skipped.
pub fn display_dry_run(command: &str) {
    println!("{} {}", style("[dry-run]").cyan(), style(command).dim());
}

/// Show what is about to be published before anything is pushed.
pub fn display_release_plan(semver: &str, major: &str, remote: &str) {
    println!("\n{}", style("Release plan:").bold());
    println!("  Create: {}", style(semver).green());
    println!("  Move:   {}", style(major).green());
    println!("  Remote: {}", remote);
}

/// Final report: each tag and the short commit it resolves to.
///
/// # Arguments
/// * `entries` - (tag name, short commit) pairs
/// * `dry_run` - whether the commits are what the tags *would* resolve to
pub fn display_summary(entries: &[(String, String)], dry_run: bool) {
    let heading = if dry_run {
        "Tags would resolve to:"
    } else {
        "Tags resolve to:"
    };
    println!("\n{}", style(heading).bold());
    for line in summary_lines(entries) {
        println!("{}", line);
    }
}

fn summary_lines(entries: &[(String, String)]) -> Vec<String> {
    let width = entries.iter().map(|(tag, _)| tag.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|(tag, commit)| format!("  {:width$}  {}", tag, commit, width = width))
        .collect()
}
