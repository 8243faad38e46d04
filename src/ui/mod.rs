//! User interface module - run reports and the stdout summary contract.
//!
//! Separates concerns:
//! - `formatter` - Status formatting on stderr
//! - This module - Summary emission for calling automation

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::cli::{ReleaseSummary, WorkflowResult};
use crate::error::{ReleaseError, Result};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    describe_change, describe_rewrite, display_boundary_warning, display_error, display_status,
    display_success,
};

/// Write the summary lines to `out`
///
/// Nothing but `key=value` lines is ever written here.
pub fn write_summary<W: Write>(out: &mut W, summary: &ReleaseSummary) -> io::Result<()> {
    for line in summary.lines() {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

/// Print the summary on stdout
pub fn print_summary(summary: &ReleaseSummary) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_summary(&mut handle, summary)?;
    Ok(())
}

/// Append the summary to a CI step output file such as `$GITHUB_OUTPUT`
pub fn append_summary(path: &Path, summary: &ReleaseSummary) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ReleaseError::file(path, e))?;
    write_summary(&mut file, summary).map_err(|e| ReleaseError::file(path, e))
}

/// Report what a run did on stderr
///
/// Warnings are always shown; progress lines are dropped when `quiet`.
pub fn display_result(result: &WorkflowResult, quiet: bool) {
    if !quiet {
        if result.dry_run {
            display_status(&format!(
                "Dry run of {} mode, no files were changed",
                result.mode
            ));
        }
        for change in &result.changes {
            display_success(&describe_change(change, result.dry_run));
        }
    }

    for warning in &result.warnings {
        display_boundary_warning(warning);
    }
}
