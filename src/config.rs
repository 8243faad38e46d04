use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};

/// File name looked up in the project root
pub const CONFIG_FILE_NAME: &str = "prepare-release.toml";

/// Represents the complete configuration for prepare-release.
///
/// Contains the document locations, changelog tokens and build descriptor commands.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub descriptor: DescriptorConfig,
}

fn default_readme() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_changelog() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_release_notes_dir() -> PathBuf {
    PathBuf::from("release")
}

/// Locations of the documents rewritten during a run, relative to the project root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DocumentsConfig {
    #[serde(default = "default_readme")]
    pub readme: PathBuf,

    #[serde(default = "default_changelog")]
    pub changelog: PathBuf,

    #[serde(default = "default_release_notes_dir")]
    pub release_notes_dir: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        DocumentsConfig {
            readme: default_readme(),
            changelog: default_changelog(),
            release_notes_dir: default_release_notes_dir(),
        }
    }
}

fn default_unreleased_heading() -> String {
    "Unreleased".to_string()
}

fn default_placeholder() -> String {
    "- _No changes yet._".to_string()
}

fn default_section_level() -> usize {
    2
}

/// Tokens that identify the structure of the changelog.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChangelogConfig {
    /// Heading text of the section accumulating pending entries
    #[serde(default = "default_unreleased_heading")]
    pub unreleased_heading: String,

    /// Line standing for "no entries"
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Markdown heading level of version sections (`##` = 2)
    #[serde(default = "default_section_level")]
    pub section_level: usize,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            unreleased_heading: default_unreleased_heading(),
            placeholder: default_placeholder(),
            section_level: default_section_level(),
        }
    }
}

fn default_read_command() -> Vec<String> {
    [
        "mvn",
        "-q",
        "help:evaluate",
        "-Dexpression=project.version",
        "-DforceStdout",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_write_command() -> Vec<String> {
    [
        "mvn",
        "-q",
        "versions:set",
        "-DnewVersion={version}",
        "-DgenerateBackupPoms=false",
        "-DprocessAllModules=true",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Commands that read and write the authoritative version.
///
/// `{version}` in the write command is replaced with the new version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DescriptorConfig {
    #[serde(default = "default_read_command")]
    pub read_command: Vec<String>,

    #[serde(default = "default_write_command")]
    pub write_command: Vec<String>,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        DescriptorConfig {
            read_command: default_read_command(),
            write_command: default_write_command(),
        }
    }
}

impl Config {
    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.descriptor.read_command.is_empty() {
            return Err(ReleaseError::config("descriptor.read_command is empty"));
        }
        if self.descriptor.write_command.is_empty() {
            return Err(ReleaseError::config("descriptor.write_command is empty"));
        }
        if !self
            .descriptor
            .write_command
            .iter()
            .any(|arg| arg.contains("{version}"))
        {
            return Err(ReleaseError::config(
                "descriptor.write_command must contain a {version} placeholder",
            ));
        }
        if self.changelog.section_level == 0 || self.changelog.section_level > 6 {
            return Err(ReleaseError::config(format!(
                "changelog.section_level must be between 1 and 6, got {}",
                self.changelog.section_level
            )));
        }
        if self.changelog.unreleased_heading.trim().is_empty() {
            return Err(ReleaseError::config("changelog.unreleased_heading is empty"));
        }
        if self.changelog.placeholder.trim().is_empty() {
            return Err(ReleaseError::config("changelog.placeholder is empty"));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `prepare-release.toml` in the project root
/// 3. `.prepare-release.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, root: &Path) -> Result<Config> {
    let local = root.join(CONFIG_FILE_NAME);

    let source = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if local.exists() {
        Some(local)
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(format!(".{}", CONFIG_FILE_NAME)))
            .filter(|path| path.exists())
    };

    let config = match source {
        Some(path) => parse_config_file(&path)?,
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path).map_err(|e| ReleaseError::file(path, e))?;
    toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("{}: {}", path.display(), e)))
}
