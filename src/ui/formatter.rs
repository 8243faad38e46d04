//! Formatting functions for operator output.
//!
//! Everything here goes to stderr: stdout is reserved for the `key=value`
//! summary consumed by automation.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::Change;
use crate::rewriter::RewriteOutcome;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold().for_stderr(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green().for_stderr(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow().for_stderr(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().for_stderr(), warning);
}

/// One line per rule: `2 x '1.2.2' -> '1.2.3'`
pub fn describe_rewrite(outcome: &RewriteOutcome) -> String {
    let rules: Vec<String> = outcome
        .counts
        .iter()
        .map(|(rule, count)| format!("{} x '{}' -> '{}'", count, rule.old, rule.new))
        .collect();
    format!("{}: {}", outcome.path.display(), rules.join(", "))
}

/// Human readable description of a change
///
/// Dry runs are phrased as intentions.
pub fn describe_change(change: &Change, dry_run: bool) -> String {
    let verb = |done: &str, planned: &str| {
        if dry_run {
            planned.to_string()
        } else {
            done.to_string()
        }
    };

    match change {
        Change::Descriptor { version } => format!(
            "{} build descriptor version to {}",
            verb("Set", "Would set"),
            version
        ),
        Change::Rewritten(outcome) => format!(
            "{} {}",
            verb("Rewrote", "Would rewrite"),
            describe_rewrite(outcome)
        ),
        Change::Written { path, what } => format!(
            "{} {} {}",
            verb("Wrote", "Would write"),
            what,
            path.display()
        ),
    }
}
