#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn docs(dir: &TempDir) -> PathBuf {
    dir.path().join("project_documentation")
}

fn storyforge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("storyforge").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PROJECT_DOCS")
        .env_remove("STORY_CATALOG")
        .env_remove("HARMONIZE_LOG")
        .env_remove("HARMONIZE_REPORT")
        .arg("--docs")
        .arg(docs(dir))
        .arg("--no-speak");
    cmd
}

fn write_epic(dir: &TempDir, name: &str, body: &str) {
    let epics = docs(dir).join("epics");
    std::fs::create_dir_all(&epics).unwrap();
    std::fs::write(epics.join(name), body).unwrap();
}

fn story_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(docs(dir).join("stories"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// storyforge generate
// ---------------------------------------------------------------------------

#[test]
fn generate_materializes_builtin_catalog() {
    let dir = TempDir::new().unwrap();
    storyforge(&dir)
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("STORY GENERATION COMPLETE"));

    assert_eq!(story_files(&dir).len(), 353);
    let mapping = std::fs::read_to_string(docs(&dir).join("story-to-epic-mapping.md")).unwrap();
    assert!(mapping.starts_with("# Story to Epic Mapping"));
}

#[test]
fn generate_twice_skips_everything() {
    let dir = TempDir::new().unwrap();
    storyforge(&dir).arg("generate").assert().success();

    let out = storyforge(&dir)
        .args(["--json", "generate"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(summary["created"], 0);
    assert_eq!(summary["skipped"], 353);
    assert_eq!(summary["expected"], 353);
}

#[test]
fn generate_from_catalog_file() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog.yaml");
    std::fs::write(
        &catalog,
        "epics:\n  - id: EPIC-900A\n    name: Demo Frontend\n    stories:\n      - { id: STORY-900A, title: Demo screen }\n      - { id: STORY-901A, title: Demo settings }\n",
    )
    .unwrap();

    storyforge(&dir)
        .arg("--catalog")
        .arg(&catalog)
        .arg("generate")
        .assert()
        .success();

    assert_eq!(
        story_files(&dir),
        vec!["STORY-900A-demo-screen.md", "STORY-901A-demo-settings.md"]
    );
}

#[test]
fn generate_rejects_bad_catalog() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog.yaml");
    std::fs::write(&catalog, "epics:\n  - id: NOT-AN-EPIC\n    name: Broken\n").unwrap();

    storyforge(&dir)
        .arg("--catalog")
        .arg(&catalog)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn generate_refuses_story_ids_that_leave_stories_dir() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog.yaml");
    std::fs::write(
        &catalog,
        "epics:\n  - id: EPIC-900A\n    name: Demo Frontend\n    stories:\n      - { id: \"../../escaped/STORY-1\", title: Pwn }\n",
    )
    .unwrap();

    storyforge(&dir)
        .arg("--catalog")
        .arg(&catalog)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));

    assert!(!dir.path().join("escaped").exists());
    assert!(!docs(&dir).join("stories").join("escaped").exists());
}

// ---------------------------------------------------------------------------
// storyforge harmonize
// ---------------------------------------------------------------------------

#[test]
fn harmonize_splits_creates_and_reports() {
    let dir = TempDir::new().unwrap();
    write_epic(&dir, "EPIC-099-foo.md", "# Foo\n\nSee [STORY-101].\n");
    write_epic(&dir, "EPIC-005-ai-infrastructure.md", "# AI\n");

    storyforge(&dir)
        .arg("harmonize")
        .assert()
        .success()
        .stdout(predicate::str::contains("Harmonization completed successfully!"));

    let epics = docs(&dir).join("epics");
    assert!(epics.join("EPIC-099-foo-SPLIT.md").exists());
    assert!(epics.join("EPIC-099A-foo-frontend.md").exists());
    assert!(epics.join("EPIC-099B-foo-backend.md").exists());
    assert!(!epics.join("EPIC-099-foo.md").exists());
    assert!(epics.join("EPIC-005-ai-infrastructure.md").exists());
    assert!(!epics.join("EPIC-005A-ai-infrastructure-frontend.md").exists());

    // five per remaining epic: 099A, 099B and 005
    assert_eq!(story_files(&dir).len(), 15);

    let report = std::fs::read_to_string(dir.path().join("harmonization-report.md")).unwrap();
    assert!(report.contains("- **Total Epics**: 3"));
    assert!(report.contains("- **Total Stories**: 15"));
    assert!(report.contains("No validation issues found!"));

    let log = std::fs::read_to_string(dir.path().join("harmonization.log")).unwrap();
    assert!(log.contains("[INFO] === PHASE 1: Splitting Full-Stack Epics ==="));
    assert!(log.contains("[INFO] === Harmonization Complete ==="));

    let backups = std::fs::read_dir(docs(&dir).join("backups")).unwrap().count();
    assert_eq!(backups, 1);
}

#[test]
fn harmonize_without_epics_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(docs(&dir)).unwrap();

    storyforge(&dir)
        .arg("harmonize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: harmonization failed"));
}

#[test]
fn harmonize_respects_log_and_report_overrides() {
    let dir = TempDir::new().unwrap();
    write_epic(&dir, "EPIC-001A-timeline-frontend.md", "# Timeline\n");
    let log = dir.path().join("out/run.log");
    let report = dir.path().join("out/report.md");

    storyforge(&dir)
        .env("HARMONIZE_LOG", &log)
        .env("HARMONIZE_REPORT", &report)
        .arg("harmonize")
        .assert()
        .success();

    assert!(log.exists());
    assert!(report.exists());
    assert!(!dir.path().join("harmonization-report.md").exists());
}

// ---------------------------------------------------------------------------
// storyforge report / check
// ---------------------------------------------------------------------------

#[test]
fn report_json_leaves_documents_alone() {
    let dir = TempDir::new().unwrap();
    write_epic(&dir, "EPIC-099-foo.md", "# Foo\n");

    let out = storyforge(&dir)
        .args(["--json", "report"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["summary"]["total_epics"], 1);
    assert_eq!(report["summary"]["infrastructure_epics"], 1);
    assert_eq!(report["summary"]["total_stories"], 0);

    assert!(docs(&dir).join("epics/EPIC-099-foo.md").exists());
    assert!(!docs(&dir).join("backups").exists());
    assert!(dir.path().join("harmonization-report.md").exists());
}

#[test]
fn check_flags_empty_exclusion_keyword() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(docs(&dir)).unwrap();
    std::fs::write(
        docs(&dir).join("harmonize.yaml"),
        "split_exclusions: [\"\"]\n",
    )
    .unwrap();

    storyforge(&dir)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn check_accepts_defaults() {
    let dir = TempDir::new().unwrap();
    storyforge(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No warnings."));
}
