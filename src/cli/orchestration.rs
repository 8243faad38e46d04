//! Release workflow orchestration
//!
//! Sequences version computation, document rewriting, changelog promotion and
//! build descriptor updates for one run. CLI parsing lives in `main.rs`; this
//! module only needs a [`BuildDescriptor`], a [`Workspace`] and a [`Config`].
//!
//! The changelog and README are parsed and rewritten in memory before the
//! build descriptor is touched, so a drifted document leaves the project as it
//! was. A failure after that point aborts the run at the stage where it
//! happened; files already written are not rolled back and the working tree is
//! expected to be under version control.

use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::descriptor::BuildDescriptor;
use crate::domain::{ChangelogDocument, SemanticVersion};
use crate::error::{ReleaseError, Result};
use crate::files::Workspace;
use crate::rewriter::{
    DocumentRewrite, PlannedRewrite, RewriteOutcome, Substitution, VersionRewriter,
};

/// Which transition path a run takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Promote the current snapshot to a release, then move to the next snapshot
    Release,
    /// Move to the next patch snapshot
    Snapshot,
}

impl FromStr for Mode {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "release" => Ok(Mode::Release),
            "snapshot" => Ok(Mode::Snapshot),
            other => Err(ReleaseError::usage(format!(
                "unknown mode '{}', expected 'release' or 'snapshot'",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Release => write!(f, "release"),
            Mode::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Workflow states, in the order a release run passes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    VersionRead,
    VersionComputed,
    DescriptorUpdated,
    FilesRewritten,
    ChangelogUpdated,
    NotesWritten,
    NextVersionCommitted,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::VersionRead => "version read",
            Stage::VersionComputed => "version computed",
            Stage::DescriptorUpdated => "descriptor updated",
            Stage::FilesRewritten => "files rewritten",
            Stage::ChangelogUpdated => "changelog updated",
            Stage::NotesWritten => "release notes written",
            Stage::NextVersionCommitted => "next version committed",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Machine-readable outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseSummary {
    /// Set in release mode only
    pub release_version: Option<SemanticVersion>,
    pub next_version: SemanticVersion,
}

impl ReleaseSummary {
    /// `key=value` lines in output order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(release) = self.release_version {
            lines.push(format!("release_version={}", release));
        }
        lines.push(format!("next_version={}", self.next_version));
        lines
    }
}

/// Something a run wrote (or would write in dry-run mode)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Authoritative version set through the build descriptor
    Descriptor { version: SemanticVersion },
    /// Document literals rewritten
    Rewritten(RewriteOutcome),
    /// Whole document (re)written
    Written { path: PathBuf, what: &'static str },
}

/// Result of a successful workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub mode: Mode,
    pub summary: ReleaseSummary,
    pub changes: Vec<Change>,
    pub warnings: Vec<BoundaryWarning>,
    pub dry_run: bool,
}

/// Drives one release or snapshot run
pub struct ReleaseOrchestrator<'a, D: BuildDescriptor> {
    config: &'a Config,
    workspace: &'a Workspace,
    descriptor: &'a mut D,
    stage: Stage,
    changes: Vec<Change>,
    warnings: Vec<BoundaryWarning>,
}

impl<'a, D: BuildDescriptor> ReleaseOrchestrator<'a, D> {
    pub fn new(config: &'a Config, workspace: &'a Workspace, descriptor: &'a mut D) -> Self {
        ReleaseOrchestrator {
            config,
            workspace,
            descriptor,
            stage: Stage::Start,
            changes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Last stage reached; after a failure this is where the run stopped
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the workflow for `mode`; `date` heads the released changelog section
    pub fn run(mut self, mode: Mode, date: NaiveDate) -> Result<WorkflowResult> {
        let summary = self.execute(mode, date)?;
        Ok(self.into_result(mode, summary))
    }

    /// Run the workflow but keep the orchestrator, so that after a failure
    /// [`stage`](Self::stage) tells where the run stopped
    pub fn execute(&mut self, mode: Mode, date: NaiveDate) -> Result<ReleaseSummary> {
        let summary = match mode {
            Mode::Release => self.run_release(date)?,
            Mode::Snapshot => self.run_snapshot()?,
        };
        self.advance(Stage::Done);
        Ok(summary)
    }

    /// Collect what a finished run changed
    pub fn into_result(self, mode: Mode, summary: ReleaseSummary) -> WorkflowResult {
        WorkflowResult {
            mode,
            summary,
            changes: self.changes,
            warnings: self.warnings,
            dry_run: self.workspace.is_dry_run(),
        }
    }

    fn run_release(&mut self, date: NaiveDate) -> Result<ReleaseSummary> {
        let current = self.read_current()?;
        let release = current.to_release()?;
        let next = release.next_snapshot()?;
        self.advance(Stage::VersionComputed);

        // Promote and plan the README in memory first, so document problems
        // abort before the descriptor or any file is written.
        let mut changelog = self.load_changelog()?;
        let last_published = changelog.latest_release();
        if changelog.release_entries(&release).is_some() {
            self.warn(BoundaryWarning::ReleaseSectionExists {
                version: release.to_string(),
            });
        } else if changelog.extract_unreleased().is_empty() {
            self.warn(BoundaryWarning::NoPendingEntries {
                version: release.to_string(),
            });
        }
        let entries = changelog.promote(release, date)?;

        // A project without a dated release yet has no published literal to move.
        let published_rule = match last_published {
            Some(published) => Substitution::new(published.to_string(), release.to_string()),
            None => Substitution::optional(release.to_string(), release.to_string()),
        };
        let readme = self.plan_readme(vec![
            Substitution::new(current.to_string(), next.to_string()),
            published_rule,
        ])?;

        self.commit_version(release)?;
        self.advance(Stage::DescriptorUpdated);

        self.apply_readme(readme)?;
        self.advance(Stage::FilesRewritten);

        let changelog_path = self.config.documents.changelog.clone();
        self.write_document(changelog_path, &changelog.to_string(), "changelog")?;
        self.advance(Stage::ChangelogUpdated);

        self.write_release_notes(release, &entries)?;
        self.advance(Stage::NotesWritten);

        self.commit_version(next)?;
        self.advance(Stage::NextVersionCommitted);

        Ok(ReleaseSummary {
            release_version: Some(release),
            next_version: next,
        })
    }

    fn run_snapshot(&mut self) -> Result<ReleaseSummary> {
        let current = self.read_current()?;
        let next = current.release_form().next_snapshot()?;
        self.advance(Stage::VersionComputed);

        let mut changelog = self.load_changelog()?;
        let changelog_changed = self.clean_unreleased(&mut changelog, current);

        let display_rule = if current.snapshot {
            Substitution::new(current.to_string(), next.to_string())
        } else {
            Substitution::optional(current.snapshot_form().to_string(), next.to_string())
        };
        let readme = self.plan_readme(vec![display_rule])?;

        self.commit_version(next)?;
        self.advance(Stage::DescriptorUpdated);

        self.apply_readme(readme)?;
        self.advance(Stage::FilesRewritten);

        if changelog_changed {
            let changelog_path = self.config.documents.changelog.clone();
            self.write_document(changelog_path, &changelog.to_string(), "changelog")?;
        }
        self.advance(Stage::ChangelogUpdated);

        Ok(ReleaseSummary {
            release_version: None,
            next_version: next,
        })
    }

    /// Reset the unreleased section when it is empty or only repeats the
    /// section already released for `current`. Genuine pending entries stay.
    fn clean_unreleased(
        &mut self,
        changelog: &mut ChangelogDocument,
        current: SemanticVersion,
    ) -> bool {
        let pending = changelog.extract_unreleased();

        if pending.is_empty() {
            return changelog.reset_unreleased();
        }

        let stale =
            !current.snapshot && changelog.release_entries(&current).as_ref() == Some(&pending);
        if stale {
            self.warn(BoundaryWarning::StaleUnreleasedReset {
                version: current.to_string(),
            });
            return changelog.reset_unreleased();
        }

        false
    }

    fn read_current(&mut self) -> Result<SemanticVersion> {
        let raw = self.descriptor.read_version()?;
        let current = SemanticVersion::parse(&raw)?;
        self.advance(Stage::VersionRead);
        Ok(current)
    }

    fn load_changelog(&self) -> Result<ChangelogDocument> {
        let text = self.workspace.read(&self.config.documents.changelog)?;
        ChangelogDocument::parse(&text, &self.config.changelog)
    }

    fn commit_version(&mut self, version: SemanticVersion) -> Result<()> {
        if !self.workspace.is_dry_run() {
            self.descriptor.write_version(&version.to_string())?;
        }
        self.changes.push(Change::Descriptor { version });
        Ok(())
    }

    fn plan_readme(&self, substitutions: Vec<Substitution>) -> Result<PlannedRewrite> {
        let document = DocumentRewrite {
            path: self.config.documents.readme.clone(),
            substitutions,
        };
        VersionRewriter::new(self.workspace).plan(&document)
    }

    fn apply_readme(&mut self, readme: PlannedRewrite) -> Result<()> {
        let outcome = VersionRewriter::new(self.workspace).apply(readme)?;

        for (rule, count) in &outcome.counts {
            if *count == 0 && rule.old != rule.new {
                self.warn(BoundaryWarning::LiteralNotFound {
                    path: outcome.path.clone(),
                    literal: rule.old.clone(),
                });
            }
        }
        self.changes.push(Change::Rewritten(outcome));
        Ok(())
    }

    fn write_release_notes(&mut self, release: SemanticVersion, entries: &[String]) -> Result<()> {
        let path = self
            .config
            .documents
            .release_notes_dir
            .join(format!("{}.md", release));

        if self.workspace.exists(&path) {
            self.warn(BoundaryWarning::ReleaseNotesOverwritten { path: path.clone() });
        }

        let body = if entries.is_empty() {
            format!("{}\n", self.config.changelog.placeholder)
        } else {
            format!("{}\n", entries.join("\n"))
        };
        self.write_document(path, &body, "release notes")
    }

    fn write_document(&mut self, path: PathBuf, contents: &str, what: &'static str) -> Result<()> {
        self.workspace.write(&path, contents)?;
        self.changes.push(Change::Written { path, what });
        Ok(())
    }

    fn warn(&mut self, warning: BoundaryWarning) {
        self.warnings.push(warning);
    }

    fn advance(&mut self, stage: Stage) {
        self.stage = stage;
    }
}
