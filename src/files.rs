//! File access for the documents touched by a run
//!
//! Writes go to a temporary file in the target's directory which is then
//! renamed over the target, so an interrupted run never leaves a truncated
//! document behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{ReleaseError, Result};

/// Reads and writes project documents, honouring dry-run mode
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    dry_run: bool,
}

impl Workspace {
    /// Create a workspace rooted at `root`
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Workspace {
            root: root.into(),
            dry_run,
        }
    }

    /// Check if writes are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Resolve a configured path against the root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn read(&self, path: &Path) -> Result<String> {
        let full = self.resolve(path);
        fs::read_to_string(&full).map_err(|e| ReleaseError::file(full, e))
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    /// Replace the contents of `path` atomically.
    ///
    /// Missing parent directories are created. In dry-run mode nothing is
    /// touched.
    pub fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        write_atomic(&self.resolve(path), contents)
    }
}

/// Write `contents` to a sibling temp file, sync it, then rename it over `path`
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| ReleaseError::file(&parent, e))?;

    let mut temp = NamedTempFile::new_in(&parent).map_err(|e| ReleaseError::file(&parent, e))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| ReleaseError::file(path, e))?;
    temp.flush().map_err(|e| ReleaseError::file(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ReleaseError::file(path, e))?;

    if let Ok(metadata) = fs::metadata(path) {
        // Keep the target's permissions, the temp file is created 0600.
        fs::set_permissions(temp.path(), metadata.permissions())
            .map_err(|e| ReleaseError::file(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| ReleaseError::file(path, e.error))?;
    Ok(())
}
