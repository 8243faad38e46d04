use chrono::NaiveDate;
use prepare_release::boundary::BoundaryWarning;
use prepare_release::cli::{Change, Mode, ReleaseOrchestrator, Stage};
use prepare_release::config::Config;
use prepare_release::descriptor::MockDescriptor;
use prepare_release::domain::{ChangelogDocument, Heading, SemanticVersion};
use prepare_release::error::ReleaseError;
use prepare_release::files::Workspace;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const README: &str = "\
# ta4j

```xml
<dependency>
  <groupId>org.ta4j</groupId>
  <artifactId>ta4j-core</artifactId>
  <version>1.2.2</version>
</dependency>
<dependency>
  <groupId>org.ta4j</groupId>
  <artifactId>ta4j-examples</artifactId>
  <version>1.2.2</version>
</dependency>
```

The current snapshot version is `1.2.3-SNAPSHOT`.
Snapshots such as 1.2.3-SNAPSHOT are published nightly.
";

const CHANGELOG: &str = "\
# Changelog

## Unreleased
- Added brand-new trading strategy helper.

## 1.2.2 (2026-03-01)
- Fixed rounding in cash flow.
";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn project(readme: &str, changelog: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("README.md"), readme).unwrap();
    fs::write(dir.path().join("CHANGELOG.md"), changelog).unwrap();
    dir
}

fn read(dir: &TempDir, path: &str) -> String {
    fs::read_to_string(dir.path().join(path)).unwrap()
}

fn parse_changelog(text: &str) -> ChangelogDocument {
    ChangelogDocument::parse(text, &Config::default().changelog).unwrap()
}

#[test]
fn test_release_mode_full_scenario() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    assert_eq!(
        result.summary.lines(),
        vec!["release_version=1.2.3", "next_version=1.2.4-SNAPSHOT"]
    );
    assert_eq!(descriptor.writes(), ["1.2.3", "1.2.4-SNAPSHOT"]);
    assert_eq!(descriptor.version(), "1.2.4-SNAPSHOT");

    assert_eq!(
        read(&dir, "CHANGELOG.md"),
        "\
# Changelog

## Unreleased
- _No changes yet._

## 1.2.3 (2026-10-19)
- Added brand-new trading strategy helper.

## 1.2.2 (2026-03-01)
- Fixed rounding in cash flow.
"
    );
    assert_eq!(
        read(&dir, "release/1.2.3.md"),
        "- Added brand-new trading strategy helper.\n"
    );
}

#[test]
fn test_release_mode_rewrites_readme_literals() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    let readme = read(&dir, "README.md");
    assert_eq!(readme.matches("<version>1.2.3</version>").count(), 2);
    assert_eq!(readme.matches("1.2.4-SNAPSHOT").count(), 2);
    assert!(!readme.contains("1.2.2"));
    assert!(!readme.contains("1.2.3-SNAPSHOT"));

    let rewritten = result
        .changes
        .iter()
        .find_map(|c| match c {
            Change::Rewritten(outcome) => Some(outcome),
            _ => None,
        })
        .unwrap();
    assert_eq!(rewritten.total(), 4);
}

#[test]
fn test_release_preserves_every_entry() {
    let changelog = "\
# Changelog

## Unreleased
### Added
- Added brand-new trading strategy helper.
- Added `MinuteOfHourRule`.

### Fixed
- Fixed NaN handling in `ReturnsCriterion`.

## 1.2.2 (2026-03-01)
- Fixed rounding in cash flow.
";
    let dir = project(README, changelog);
    let before = parse_changelog(changelog).extract_unreleased();

    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");
    ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    let after = parse_changelog(&read(&dir, "CHANGELOG.md"));
    assert_eq!(after.release_entries(&SemanticVersion::new(1, 2, 3)), Some(before.clone()));
    assert_eq!(read(&dir, "release/1.2.3.md"), format!("{}\n", before.join("\n")));
    assert_eq!(after.sections()[0].heading, Heading::Unreleased);
    assert!(after.extract_unreleased().is_empty());
}

#[test]
fn test_release_with_empty_unreleased_creates_placeholder_section() {
    let changelog = "\
# Changelog

## Unreleased
- _No changes yet._

## 1.2.2 (2026-03-01)
- Fixed rounding in cash flow.
";
    let dir = project(README, changelog);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    let after = parse_changelog(&read(&dir, "CHANGELOG.md"));
    assert_eq!(after.sections()[1].title, "1.2.3 (2026-10-19)");
    assert_eq!(after.sections()[1].lines, vec!["- _No changes yet._"]);
    assert_eq!(read(&dir, "release/1.2.3.md"), "- _No changes yet._\n");
    assert!(result.warnings.contains(&BoundaryWarning::NoPendingEntries {
        version: "1.2.3".to_string()
    }));
}

#[test]
fn test_release_requires_snapshot() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3");

    let mut orchestrator = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor);
    let err = orchestrator.execute(Mode::Release, today()).unwrap_err();

    assert!(matches!(err, ReleaseError::NotASnapshot(_)));
    assert_eq!(orchestrator.stage(), Stage::VersionRead);
    assert!(descriptor.writes().is_empty());
    assert_eq!(read(&dir, "CHANGELOG.md"), CHANGELOG);
}

#[test]
fn test_malformed_descriptor_version() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2-SNAPSHOT");

    let mut orchestrator = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor);
    let err = orchestrator.execute(Mode::Snapshot, today()).unwrap_err();

    assert!(matches!(err, ReleaseError::MalformedVersion(_)));
    assert_eq!(orchestrator.stage(), Stage::Start);
}

#[test]
fn test_release_with_drifted_readme_fails() {
    let readme = "The current snapshot version is `1.2.3-SNAPSHOT`.\n";
    let dir = project(readme, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let mut orchestrator = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor);
    let err = orchestrator.execute(Mode::Release, today()).unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::NoOccurrencesFound { ref literal, .. } if literal == "1.2.2"
    ));
    assert_eq!(orchestrator.stage(), Stage::VersionComputed);
    assert!(descriptor.writes().is_empty());
    assert_eq!(descriptor.version(), "1.2.3-SNAPSHOT");
    assert_eq!(read(&dir, "README.md"), readme);
    assert_eq!(read(&dir, "CHANGELOG.md"), CHANGELOG);
    assert!(!dir.path().join("release").exists());
}

#[test]
fn test_release_retry_after_fixing_drifted_readme() {
    let dir = project("The current snapshot version is `1.2.3-SNAPSHOT`.\n", CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap_err();

    fs::write(dir.path().join("README.md"), README).unwrap();
    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    assert_eq!(
        result.summary.release_version,
        Some(SemanticVersion::new(1, 2, 3))
    );
    assert_eq!(descriptor.writes(), ["1.2.3", "1.2.4-SNAPSHOT"]);
}

#[test]
fn test_release_patch_overflow_writes_nothing() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.18446744073709551615-SNAPSHOT");

    let mut orchestrator = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor);
    let err = orchestrator.execute(Mode::Release, today()).unwrap_err();

    assert!(matches!(err, ReleaseError::VersionOverflow(_)));
    assert_eq!(orchestrator.stage(), Stage::VersionRead);
    assert!(descriptor.writes().is_empty());
    assert_eq!(read(&dir, "CHANGELOG.md"), CHANGELOG);
}

#[test]
fn test_release_with_malformed_changelog_writes_nothing() {
    let changelog = "# Changelog\n\n## 1.2.2 (2026-03-01)\n- Fixed rounding.\n";
    let dir = project(README, changelog);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let err = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap_err();

    assert!(matches!(err, ReleaseError::ChangelogFormat(_)));
    assert!(descriptor.writes().is_empty());
    assert_eq!(read(&dir, "README.md"), README);
}

#[test]
fn test_first_release_without_history() {
    let readme = "Try `0.1.0-SNAPSHOT` today.\n";
    let changelog = "# Changelog\n\n## Unreleased\n- First cut.\n";
    let dir = project(readme, changelog);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("0.1.0-SNAPSHOT");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    assert_eq!(
        result.summary.lines(),
        vec!["release_version=0.1.0", "next_version=0.1.1-SNAPSHOT"]
    );
    assert_eq!(read(&dir, "README.md"), "Try `0.1.1-SNAPSHOT` today.\n");
    assert_eq!(read(&dir, "release/0.1.0.md"), "- First cut.\n");
}

#[test]
fn test_snapshot_mode_on_release_version() {
    let readme = "<version>2.5.0</version>\n<version>2.5.0</version>\n";
    let changelog = "\
# Changelog

## Unreleased
- _No changes yet._

## 2.5.0 (2026-02-14)
- Initial public release.
";
    let dir = project(readme, changelog);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("2.5.0");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Snapshot, today())
        .unwrap();

    assert_eq!(result.summary.lines(), vec!["next_version=2.5.1-SNAPSHOT"]);
    assert_eq!(descriptor.version(), "2.5.1-SNAPSHOT");
    assert_eq!(read(&dir, "CHANGELOG.md"), changelog);
    // Dependency declarations keep pointing at the published release.
    assert_eq!(read(&dir, "README.md"), readme);
    assert!(!dir.path().join("release").exists());
    assert!(result.warnings.iter().any(|w| matches!(
        w,
        BoundaryWarning::LiteralNotFound { literal, .. } if literal == "2.5.0-SNAPSHOT"
    )));
}

#[test]
fn test_snapshot_mode_on_snapshot_version() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Snapshot, today())
        .unwrap();

    assert_eq!(result.summary.lines(), vec!["next_version=1.2.4-SNAPSHOT"]);
    let readme = read(&dir, "README.md");
    assert_eq!(readme.matches("1.2.4-SNAPSHOT").count(), 2);
    assert_eq!(readme.matches("<version>1.2.2</version>").count(), 2);
    // Pending entries are genuine and survive.
    assert_eq!(read(&dir, "CHANGELOG.md"), CHANGELOG);
}

#[test]
fn test_snapshot_mode_requires_display_literal_for_snapshots() {
    let dir = project("nothing to see\n", CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let err = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Snapshot, today())
        .unwrap_err();

    assert!(matches!(err, ReleaseError::NoOccurrencesFound { .. }));
    assert!(descriptor.writes().is_empty());
    assert_eq!(read(&dir, "CHANGELOG.md"), CHANGELOG);
}

#[test]
fn test_snapshot_mode_resets_stale_entries() {
    let changelog = "\
# Changelog

## Unreleased
- Initial public release.

## 2.5.0 (2026-02-14)
- Initial public release.
";
    let dir = project("2.5.0-SNAPSHOT\n", changelog);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("2.5.0");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Snapshot, today())
        .unwrap();

    let after = parse_changelog(&read(&dir, "CHANGELOG.md"));
    assert!(after.extract_unreleased().is_empty());
    assert_eq!(after.sections().len(), 2);
    assert_eq!(read(&dir, "README.md"), "2.5.1-SNAPSHOT\n");
    assert!(result.warnings.contains(&BoundaryWarning::StaleUnreleasedReset {
        version: "2.5.0".to_string()
    }));
}

#[test]
fn test_snapshot_mode_fills_empty_unreleased_section() {
    let changelog = "# Changelog\n\n## Unreleased\n\n## 2.5.0 (2026-02-14)\n- Initial.\n";
    let dir = project("x\n", changelog);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("2.5.0");

    ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Snapshot, today())
        .unwrap();

    assert_eq!(
        read(&dir, "CHANGELOG.md"),
        "# Changelog\n\n## Unreleased\n- _No changes yet._\n\n## 2.5.0 (2026-02-14)\n- Initial.\n"
    );
}

#[test]
fn test_unreleased_first_after_any_run() {
    for (mode, version) in [
        (Mode::Release, "1.2.3-SNAPSHOT"),
        (Mode::Snapshot, "1.2.3-SNAPSHOT"),
    ] {
        let dir = project(README, CHANGELOG);
        let config = Config::default();
        let workspace = Workspace::new(dir.path(), false);
        let mut descriptor = MockDescriptor::new(version);

        ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
            .run(mode, today())
            .unwrap();

        let after = parse_changelog(&read(&dir, "CHANGELOG.md"));
        assert_eq!(after.sections()[0].heading, Heading::Unreleased, "{}", mode);
    }
}

#[test]
fn test_release_then_release_again() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();
    let second = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    assert_eq!(
        second.summary.lines(),
        vec!["release_version=1.2.4", "next_version=1.2.5-SNAPSHOT"]
    );
    let after = parse_changelog(&read(&dir, "CHANGELOG.md"));
    let titles: Vec<&str> = after.sections().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Unreleased", "1.2.4 (2026-10-19)", "1.2.3 (2026-10-19)", "1.2.2 (2026-03-01)"]
    );
    let readme = read(&dir, "README.md");
    assert_eq!(readme.matches("<version>1.2.4</version>").count(), 2);
    assert_eq!(readme.matches("1.2.5-SNAPSHOT").count(), 2);
}

#[test]
fn test_release_notes_overwrite_warns() {
    let dir = project(README, CHANGELOG);
    fs::create_dir_all(dir.path().join("release")).unwrap();
    fs::write(dir.path().join("release/1.2.3.md"), "stale\n").unwrap();
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    assert!(result.warnings.contains(&BoundaryWarning::ReleaseNotesOverwritten {
        path: Path::new("release").join("1.2.3.md")
    }));
    assert_eq!(
        read(&dir, "release/1.2.3.md"),
        "- Added brand-new trading strategy helper.\n"
    );
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), true);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    let result = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    assert!(result.dry_run);
    assert_eq!(
        result.summary.lines(),
        vec!["release_version=1.2.3", "next_version=1.2.4-SNAPSHOT"]
    );
    assert!(descriptor.writes().is_empty());
    assert_eq!(read(&dir, "README.md"), README);
    assert_eq!(read(&dir, "CHANGELOG.md"), CHANGELOG);
    assert!(!dir.path().join("release").exists());
    assert_eq!(
        result
            .changes
            .iter()
            .filter(|c| matches!(c, Change::Descriptor { .. }))
            .count(),
        2
    );
}

#[test]
fn test_descriptor_write_failure_aborts_before_documents() {
    let dir = project(README, CHANGELOG);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT").failing_writes();

    let mut orchestrator = ReleaseOrchestrator::new(&config, &workspace, &mut descriptor);
    let err = orchestrator.execute(Mode::Release, today()).unwrap_err();

    assert!(matches!(err, ReleaseError::Descriptor(_)));
    assert_eq!(orchestrator.stage(), Stage::VersionComputed);
    assert_eq!(read(&dir, "README.md"), README);
    assert_eq!(read(&dir, "CHANGELOG.md"), CHANGELOG);
}

#[test]
fn test_custom_document_locations() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/INDEX.md"), README).unwrap();
    fs::write(dir.path().join("docs/HISTORY.md"), CHANGELOG).unwrap();

    let mut config = Config::default();
    config.documents.readme = "docs/INDEX.md".into();
    config.documents.changelog = "docs/HISTORY.md".into();
    config.documents.release_notes_dir = "target/notes".into();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    assert!(read(&dir, "docs/INDEX.md").contains("1.2.4-SNAPSHOT"));
    assert!(read(&dir, "docs/HISTORY.md").contains("## 1.2.3 (2026-10-19)"));
    assert!(dir.path().join("target/notes/1.2.3.md").exists());
}

#[test]
fn test_release_drops_leftover_placeholder() {
    let changelog = "\
# Changelog

## Unreleased
- _No changes yet._
- Added brand-new trading strategy helper.

## 1.2.2 (2026-03-01)
- Fixed rounding in cash flow.
";
    let dir = project(README, changelog);
    let config = Config::default();
    let workspace = Workspace::new(dir.path(), false);
    let mut descriptor = MockDescriptor::new("1.2.3-SNAPSHOT");

    ReleaseOrchestrator::new(&config, &workspace, &mut descriptor)
        .run(Mode::Release, today())
        .unwrap();

    assert_eq!(
        read(&dir, "release/1.2.3.md"),
        "- Added brand-new trading strategy helper.\n"
    );
    let after = parse_changelog(&read(&dir, "CHANGELOG.md"));
    assert_eq!(
        after.sections()[1].lines,
        vec!["- Added brand-new trading strategy helper."]
    );
}
