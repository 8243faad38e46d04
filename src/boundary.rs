use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions noticed during a run.
/// These are reported to the operator but never change the outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Release promoted with nothing pending in the unreleased section
    NoPendingEntries { version: String },
    /// The changelog already had a section for the version being released
    ReleaseSectionExists { version: String },
    /// A release notes file from an earlier run was replaced
    ReleaseNotesOverwritten { path: PathBuf },
    /// An optional literal was not present in a document
    LiteralNotFound { path: PathBuf, literal: String },
    /// Unreleased entries duplicated an already released section and were cleared
    StaleUnreleasedReset { version: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoPendingEntries { version } => {
                write!(
                    f,
                    "No unreleased changelog entries; {} gets a placeholder-only section",
                    version
                )
            }
            BoundaryWarning::ReleaseSectionExists { version } => {
                write!(
                    f,
                    "Changelog already contains a section for {}; reusing it",
                    version
                )
            }
            BoundaryWarning::ReleaseNotesOverwritten { path } => {
                write!(f, "Overwriting existing release notes '{}'", path.display())
            }
            BoundaryWarning::LiteralNotFound { path, literal } => {
                write!(f, "'{}' not found in '{}'", literal, path.display())
            }
            BoundaryWarning::StaleUnreleasedReset { version } => {
                write!(
                    f,
                    "Unreleased entries were already released in {}; reset to placeholder",
                    version
                )
            }
        }
    }
}
