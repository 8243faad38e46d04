//! Domain logic - pure version and changelog rules independent of the file system

pub mod changelog;
pub mod version;

pub use changelog::{ChangelogDocument, Heading, Section};
pub use version::{SemanticVersion, SNAPSHOT_SUFFIX};
