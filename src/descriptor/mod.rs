//! Build descriptor abstraction
//!
//! The authoritative project version lives in the build descriptor (for
//! example a Maven `pom.xml`). It is never edited by text substitution: reads
//! and writes go through the [`BuildDescriptor`] trait so that any descriptor
//! format is supported.
//!
//! - [`CommandDescriptor`]: runs configured build tool commands
//! - [`MockDescriptor`]: in-memory implementation for tests

pub mod command;
pub mod mock;

pub use command::CommandDescriptor;
pub use mock::MockDescriptor;

use crate::error::Result;

/// Read/write access to the authoritative version
///
/// Implementations map their failures to
/// [`ReleaseError::Descriptor`](crate::error::ReleaseError::Descriptor).
pub trait BuildDescriptor {
    /// Return the raw current version string
    ///
    /// The caller parses and validates it.
    fn read_version(&self) -> Result<String>;

    /// Set the authoritative version and persist it
    fn write_version(&mut self, version: &str) -> Result<()>;
}
