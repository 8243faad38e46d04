//! Literal version substitution across documents
//!
//! Documents are not parsed: every occurrence of an old version literal is
//! replaced with the new one. Each rule declares how many occurrences it
//! expects so that a document which drifted out of sync fails loudly instead
//! of being left untouched.

use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};
use crate::files::Workspace;

/// One literal replacement rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub old: String,
    pub new: String,
    pub min_occurrences: usize,
}

impl Substitution {
    /// Rule that must match at least once
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Substitution {
            old: old.into(),
            new: new.into(),
            min_occurrences: 1,
        }
    }

    /// Rule that may match nothing
    pub fn optional(old: impl Into<String>, new: impl Into<String>) -> Self {
        Substitution {
            min_occurrences: 0,
            ..Substitution::new(old, new)
        }
    }
}

/// All rules applied to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRewrite {
    pub path: PathBuf,
    pub substitutions: Vec<Substitution>,
}

/// Counts per rule after rewriting a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub path: PathBuf,
    pub counts: Vec<(Substitution, usize)>,
    pub changed: bool,
}

impl RewriteOutcome {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Apply several rules in a single left-to-right scan.
///
/// At each position the longest matching old literal wins and replaced text
/// is never rescanned, so rules do not interfere with each other even when
/// one old literal is a prefix of another (`1.2.3` and `1.2.3-SNAPSHOT`).
pub fn rewrite(text: &str, substitutions: &[Substitution]) -> (String, Vec<usize>) {
    let mut counts = vec![0; substitutions.len()];

    let mut order: Vec<usize> = (0..substitutions.len())
        .filter(|&i| !substitutions[i].old.is_empty())
        .collect();
    order.sort_by(|&a, &b| substitutions[b].old.len().cmp(&substitutions[a].old.len()));

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        let hit = order
            .iter()
            .copied()
            .find(|&i| rest.starts_with(substitutions[i].old.as_str()));

        match hit {
            Some(i) => {
                out.push_str(&substitutions[i].new);
                rest = &rest[substitutions[i].old.len()..];
                counts[i] += 1;
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    (out, counts)
}

/// A rewrite computed in memory whose counts already satisfy every rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRewrite {
    updated: String,
    outcome: RewriteOutcome,
}

impl PlannedRewrite {
    pub fn outcome(&self) -> &RewriteOutcome {
        &self.outcome
    }
}

/// Applies [`DocumentRewrite`]s to files in a workspace
///
/// Planning and writing are separate steps so that a caller can check every
/// document before it changes anything else.
pub struct VersionRewriter<'a> {
    workspace: &'a Workspace,
}

impl<'a> VersionRewriter<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        VersionRewriter { workspace }
    }

    /// Read a document and apply its rules in memory.
    ///
    /// Fails with `NoOccurrencesFound` if a rule matched fewer times than it
    /// expects. Nothing is written.
    pub fn plan(&self, document: &DocumentRewrite) -> Result<PlannedRewrite> {
        let original = self.workspace.read(&document.path)?;
        let (updated, counts) = rewrite(&original, &document.substitutions);

        for (rule, count) in document.substitutions.iter().zip(&counts) {
            if *count < rule.min_occurrences {
                return Err(no_occurrences(&document.path, &rule.old));
            }
        }

        let changed = updated != original;
        Ok(PlannedRewrite {
            updated,
            outcome: RewriteOutcome {
                path: document.path.clone(),
                counts: document.substitutions.iter().cloned().zip(counts).collect(),
                changed,
            },
        })
    }

    /// Write a planned rewrite; unchanged documents are left alone
    pub fn apply(&self, plan: PlannedRewrite) -> Result<RewriteOutcome> {
        if plan.outcome.changed {
            self.workspace.write(&plan.outcome.path, &plan.updated)?;
        }
        Ok(plan.outcome)
    }
}

fn no_occurrences(path: &Path, literal: &str) -> ReleaseError {
    ReleaseError::NoOccurrencesFound {
        path: path.to_path_buf(),
        literal: literal.to_string(),
    }
}
