use std::path::PathBuf;
use std::process::{Command, Output};

use crate::config::DescriptorConfig;
use crate::descriptor::BuildDescriptor;
use crate::error::{ReleaseError, Result};

/// Environment variable carrying the new version to the write command
pub const VERSION_ENV: &str = "PREPARE_RELEASE_VERSION";

/// Descriptor backed by build tool commands
///
/// The read command must print the version on stdout. In the write command
/// every `{version}` is replaced with the new version, which is also exported
/// as `PREPARE_RELEASE_VERSION`.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    read_command: Vec<String>,
    write_command: Vec<String>,
    working_dir: PathBuf,
}

impl CommandDescriptor {
    pub fn new(config: &DescriptorConfig, working_dir: impl Into<PathBuf>) -> Self {
        CommandDescriptor {
            read_command: config.read_command.clone(),
            write_command: config.write_command.clone(),
            working_dir: working_dir.into(),
        }
    }

    fn run(&self, argv: &[String], version: Option<&str>) -> Result<Output> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ReleaseError::descriptor("empty command"))?;

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.working_dir);
        if let Some(version) = version {
            cmd.env(VERSION_ENV, version);
        }

        let output = cmd.output().map_err(|e| {
            ReleaseError::descriptor(format!("Failed to execute '{}': {}", program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(ReleaseError::descriptor(format!(
                "'{}' failed with exit code {}\nStdout: {}\nStderr: {}",
                argv.join(" "),
                output.status.code().unwrap_or(-1),
                stdout.trim(),
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

impl BuildDescriptor for CommandDescriptor {
    fn read_version(&self) -> Result<String> {
        let output = self.run(&self.read_command, None)?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // Build tools may print banners before the value; the version is the last line.
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(str::to_string)
            .ok_or_else(|| {
                ReleaseError::descriptor(format!(
                    "'{}' printed no version",
                    self.read_command.join(" ")
                ))
            })
    }

    fn write_version(&mut self, version: &str) -> Result<()> {
        let argv: Vec<String> = self
            .write_command
            .iter()
            .map(|arg| arg.replace("{version}", version))
            .collect();
        self.run(&argv, Some(version))?;
        Ok(())
    }
}
