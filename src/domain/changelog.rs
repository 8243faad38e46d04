//! Changelog document model
//!
//! The changelog is parsed once into a [`ChangelogDocument`], transformed in
//! memory and serialized once. Its shape is:
//!
//! ```text
//! # Changelog            <- preamble (title and any intro text)
//!
//! ## Unreleased          <- always the first section
//! - _No changes yet._
//!
//! ## 1.2.2 (2026-03-01)  <- dated sections, newest first
//! - Fixed something.
//! ```
//!
//! Headings deeper than the section level (`### Added`) belong to the body of
//! the section that contains them.

use chrono::NaiveDate;
use regex::Regex;
use std::fmt;

use crate::config::ChangelogConfig;
use crate::domain::version::SemanticVersion;
use crate::error::{ReleaseError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Classified section heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heading {
    /// Section accumulating not-yet-released entries
    Unreleased,
    /// `<version> (<date>)`
    Release {
        version: SemanticVersion,
        date: NaiveDate,
    },
    /// Any other heading at section level
    Other,
}

/// One heading plus the lines under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: usize,
    pub title: String,
    pub heading: Heading,
    pub lines: Vec<String>,
}

impl Section {
    fn render_heading(&self) -> String {
        format!("{} {}", "#".repeat(self.level), self.title)
    }
}

/// Parsed changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogDocument {
    preamble: Vec<String>,
    sections: Vec<Section>,
    config: ChangelogConfig,
}

impl ChangelogDocument {
    /// Parse changelog text
    ///
    /// Fails with `ChangelogFormat` unless there is exactly one unreleased
    /// section and it is the first section.
    pub fn parse(text: &str, config: &ChangelogConfig) -> Result<Self> {
        let mut preamble = Vec::new();
        let mut sections: Vec<Section> = Vec::new();

        for line in text.lines() {
            // The document title sits above the section level and stays in the preamble.
            let heading = section_heading(line, config.section_level)
                .filter(|(level, _)| !sections.is_empty() || *level == config.section_level);

            match heading {
                Some((level, title)) => {
                    let heading = classify(&title, config);
                    sections.push(Section {
                        level,
                        title,
                        heading,
                        lines: Vec::new(),
                    });
                }
                None => match sections.last_mut() {
                    Some(section) => section.lines.push(line.to_string()),
                    None => preamble.push(line.to_string()),
                },
            }
        }

        trim_blank_edges(&mut preamble);
        for section in &mut sections {
            trim_blank_edges(&mut section.lines);
        }

        let doc = ChangelogDocument {
            preamble,
            sections,
            config: config.clone(),
        };
        doc.validate()?;
        Ok(doc)
    }

    fn validate(&self) -> Result<()> {
        let unreleased = self
            .sections
            .iter()
            .filter(|s| s.heading == Heading::Unreleased)
            .count();

        match unreleased {
            0 => Err(ReleaseError::changelog(format!(
                "no '{}' section found",
                self.config.unreleased_heading
            ))),
            1 if self.sections[0].heading == Heading::Unreleased => Ok(()),
            1 => Err(ReleaseError::changelog(format!(
                "'{}' must be the first section, found '{}' before it",
                self.config.unreleased_heading, self.sections[0].title
            ))),
            n => Err(ReleaseError::changelog(format!(
                "expected one '{}' section, found {}",
                self.config.unreleased_heading, n
            ))),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The unreleased section; always at index 0 once parsed
    pub fn unreleased(&self) -> &Section {
        &self.sections[0]
    }

    /// Entries pending release
    ///
    /// Placeholder lines are dropped, so a body holding only the placeholder
    /// (or nothing) is the empty set.
    pub fn extract_unreleased(&self) -> Vec<String> {
        self.entries_of(self.unreleased())
    }

    /// Entries of the dated section for `version`, if there is one
    pub fn release_entries(&self, version: &SemanticVersion) -> Option<Vec<String>> {
        self.release_index(version)
            .map(|idx| self.entries_of(&self.sections[idx]))
    }

    /// Version of the newest dated section
    pub fn latest_release(&self) -> Option<SemanticVersion> {
        self.sections.iter().find_map(|s| match s.heading {
            Heading::Release { version, .. } => Some(version),
            _ => None,
        })
    }

    /// Freeze the unreleased entries into a dated section.
    ///
    /// The unreleased section is reset to the placeholder and a section
    /// `<version> (<date>)` holding the previous entries verbatim is inserted
    /// right after it. Returns the entries of the dated section.
    ///
    /// Promoting a version that already has a section is a no-op when nothing
    /// new is pending, and an error otherwise.
    pub fn promote(&mut self, version: SemanticVersion, date: NaiveDate) -> Result<Vec<String>> {
        let entries = self.extract_unreleased();

        if let Some(idx) = self.release_index(&version) {
            if !entries.is_empty() {
                return Err(ReleaseError::changelog(format!(
                    "section '{}' already exists but '{}' still has {} pending line(s)",
                    self.sections[idx].title,
                    self.config.unreleased_heading,
                    entries.len()
                )));
            }
            self.reset_unreleased();
            return Ok(self.entries_of(&self.sections[idx]));
        }

        let body = if entries.is_empty() {
            vec![self.config.placeholder.clone()]
        } else {
            entries.clone()
        };

        let released = Section {
            level: self.config.section_level,
            title: format!("{} ({})", version, date.format(DATE_FORMAT)),
            heading: Heading::Release { version, date },
            lines: body,
        };

        self.reset_unreleased();
        self.sections.insert(1, released);
        Ok(entries)
    }

    /// Replace the unreleased body with the placeholder line.
    ///
    /// Returns whether the document changed.
    pub fn reset_unreleased(&mut self) -> bool {
        let placeholder = vec![self.config.placeholder.clone()];
        let unreleased = &mut self.sections[0];
        if unreleased.lines == placeholder {
            return false;
        }
        unreleased.lines = placeholder;
        true
    }

    fn release_index(&self, version: &SemanticVersion) -> Option<usize> {
        self.sections.iter().position(|s| {
            matches!(s.heading, Heading::Release { version: v, .. } if v == *version)
        })
    }

    // The placeholder is never an entry, even when left behind next to real ones.
    fn entries_of(&self, section: &Section) -> Vec<String> {
        let mut entries: Vec<String> = section
            .lines
            .iter()
            .filter(|line| !is_placeholder(line, &self.config))
            .cloned()
            .collect();
        trim_blank_edges(&mut entries);
        entries
    }
}

impl fmt::Display for ChangelogDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks: Vec<Vec<String>> = Vec::new();
        if !self.preamble.is_empty() {
            blocks.push(self.preamble.clone());
        }
        for section in &self.sections {
            let mut block = vec![section.render_heading()];
            block.extend(section.lines.iter().cloned());
            blocks.push(block);
        }

        let rendered: Vec<String> = blocks.iter().map(|b| b.join("\n")).collect();
        writeln!(f, "{}", rendered.join("\n\n"))
    }
}

/// Returns `(level, title)` when `line` opens a section at or above `max_level`
fn section_heading(line: &str, max_level: usize) -> Option<(usize, String)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > max_level {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((level, rest.trim().to_string()))
}

fn classify(title: &str, config: &ChangelogConfig) -> Heading {
    let bare = title.trim_start_matches('[').trim_end_matches(']');
    if bare.eq_ignore_ascii_case(config.unreleased_heading.trim()) {
        return Heading::Unreleased;
    }

    Regex::new(r"^(\S+)\s+\((\d{4}-\d{2}-\d{2})\)$")
        .ok()
        .and_then(|re| re.captures(title))
        .and_then(|captures| {
            let version = SemanticVersion::parse(captures.get(1)?.as_str()).ok()?;
            let date = NaiveDate::parse_from_str(captures.get(2)?.as_str(), DATE_FORMAT).ok()?;
            Some(Heading::Release { version, date })
        })
        .unwrap_or(Heading::Other)
}

fn is_placeholder(line: &str, config: &ChangelogConfig) -> bool {
    line.trim() == config.placeholder.trim()
}

fn trim_blank_edges(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.trim().is_empty()).count();
    lines.drain(..leading);
}
