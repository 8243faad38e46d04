use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Suffix that marks a development version
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

const SNAPSHOT_PRE: &str = "SNAPSHOT";

/// Semantic version as carried by the build descriptor
///
/// Values are immutable: derived versions are new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub snapshot: bool,
}

impl SemanticVersion {
    /// Create a released (non-snapshot) version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            snapshot: false,
        }
    }

    /// Create a snapshot version
    pub fn snapshot(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            snapshot: true,
            ..Self::new(major, minor, patch)
        }
    }

    /// Parse `X.Y.Z` or `X.Y.Z-SNAPSHOT`
    ///
    /// Surrounding whitespace is ignored since build tools usually print a
    /// trailing newline. Any other pre-release tag or build metadata is
    /// rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let parsed = semver::Version::parse(trimmed).map_err(|_| ReleaseError::malformed(raw))?;

        if !parsed.build.is_empty() {
            return Err(ReleaseError::malformed(raw));
        }

        let snapshot = match parsed.pre.as_str() {
            "" => false,
            SNAPSHOT_PRE => true,
            _ => return Err(ReleaseError::malformed(raw)),
        };

        Ok(SemanticVersion {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            snapshot,
        })
    }

    /// Strip the snapshot marker, failing if there is none
    pub fn to_release(&self) -> Result<Self> {
        if !self.snapshot {
            return Err(ReleaseError::NotASnapshot(self.to_string()));
        }
        Ok(self.release_form())
    }

    /// The same version without the snapshot marker
    pub fn release_form(&self) -> Self {
        SemanticVersion {
            snapshot: false,
            ..*self
        }
    }

    /// The same version with the snapshot marker
    pub fn snapshot_form(&self) -> Self {
        SemanticVersion {
            snapshot: true,
            ..*self
        }
    }

    /// Next patch as a snapshot: `1.2.3` -> `1.2.4-SNAPSHOT`
    ///
    /// Fails with `VersionOverflow` when the patch number is already `u64::MAX`.
    pub fn next_snapshot(&self) -> Result<Self> {
        let patch = self
            .patch
            .checked_add(1)
            .ok_or_else(|| ReleaseError::VersionOverflow(self.to_string()))?;
        Ok(SemanticVersion::snapshot(self.major, self.minor, patch))
    }
}

impl FromStr for SemanticVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.snapshot {
            f.write_str(SNAPSHOT_SUFFIX)?;
        }
        Ok(())
    }
}
