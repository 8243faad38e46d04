use crate::descriptor::BuildDescriptor;
use crate::error::{ReleaseError, Result};

/// Mock descriptor for testing without a build tool
#[derive(Debug, Clone, Default)]
pub struct MockDescriptor {
    version: String,
    writes: Vec<String>,
    fail_writes: bool,
}

impl MockDescriptor {
    /// Create a descriptor holding `version`
    pub fn new(version: impl Into<String>) -> Self {
        MockDescriptor {
            version: version.into(),
            writes: Vec::new(),
            fail_writes: false,
        }
    }

    /// Make every write fail
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Current version as last written
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Every version written, in order
    pub fn writes(&self) -> &[String] {
        &self.writes
    }
}

impl BuildDescriptor for MockDescriptor {
    fn read_version(&self) -> Result<String> {
        Ok(self.version.clone())
    }

    fn write_version(&mut self, version: &str) -> Result<()> {
        if self.fail_writes {
            return Err(ReleaseError::descriptor(format!(
                "refusing to write {}",
                version
            )));
        }
        self.version = version.to_string();
        self.writes.push(version.to_string());
        Ok(())
    }
}
