//! Five-phase harmonization of an epic/story tree.
//!
//! Each mutating phase is a function over a [`DocTree`] snapshot. The
//! [`Harmonizer`] rescans before every phase and commits the difference
//! afterwards, so a phase always sees what the previous one wrote.

pub mod create;
pub mod enhance;
pub mod link;
pub mod report;
pub mod split;

pub use report::HarmonizationReport;

use crate::config::HarmonizeConfig;
use crate::error::{ForgeError, Result};
use crate::io;
use crate::notify::Notifier;
use crate::paths::{Layout, EPICS_DIR, STORIES_DIR};
use crate::sections::SectionTable;
use crate::snapshot::DocTree;
use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

// ---------------------------------------------------------------------------
// Phase plumbing
// ---------------------------------------------------------------------------

/// Read-only inputs shared by every phase.
pub struct PhaseContext<'a> {
    pub config: &'a HarmonizeConfig,
    pub sections: &'a SectionTable,
    pub now: DateTime<Utc>,
}

pub struct PhaseOutcome {
    pub tree: DocTree,
    /// Documents created, rewritten or split by the phase.
    pub changed: usize,
}

type PhaseFn = fn(DocTree, &PhaseContext) -> Result<PhaseOutcome>;

fn phase_fn(phase: Phase) -> Option<PhaseFn> {
    match phase {
        Phase::Split => Some(split::apply),
        Phase::Create => Some(create::apply),
        Phase::Enhance => Some(enhance::apply),
        Phase::Link => Some(link::apply),
        Phase::Report => None,
    }
}

fn completion_message(phase: Phase, changed: usize) -> String {
    match phase {
        Phase::Split => format!("Split {changed} epics into frontend and backend versions"),
        Phase::Create => format!("Created {changed} new stories"),
        Phase::Enhance => format!("Enhanced {changed} stories"),
        Phase::Link => format!("Updated {changed} files with cross-references"),
        Phase::Report => "Validation report generated".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Harmonizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PhaseResult {
    pub phase: Phase,
    pub changed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarmonizeSummary {
    pub backup_path: PathBuf,
    pub phases: Vec<PhaseResult>,
    pub report_path: PathBuf,
    pub report: HarmonizationReport,
}

pub struct Harmonizer<'a> {
    layout: &'a Layout,
    config: &'a HarmonizeConfig,
    sections: &'a SectionTable,
    notifier: &'a dyn Notifier,
}

impl<'a> Harmonizer<'a> {
    pub fn new(
        layout: &'a Layout,
        config: &'a HarmonizeConfig,
        sections: &'a SectionTable,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            layout,
            config,
            sections,
            notifier,
        }
    }

    /// Back up, run the four mutating phases in order, then write the
    /// report to `report_path`. Any error aborts; nothing is rolled back.
    pub fn run(&self, report_path: &Path, now: DateTime<Utc>) -> Result<HarmonizeSummary> {
        info!("=== Starting Epic and Story Harmonization ===");
        self.notifier
            .notify("Starting epic and story harmonization process");

        let backup_path = backup(self.layout, now)?;

        let ctx = PhaseContext {
            config: self.config,
            sections: self.sections,
            now,
        };
        let mut phases = Vec::new();
        for &phase in Phase::all() {
            let Some(apply) = phase_fn(phase) else {
                continue;
            };
            phases.push(self.run_phase(phase, apply, &ctx)?);
        }

        let report = self.report(report_path, now)?;

        info!("=== Harmonization Complete ===");
        self.notifier.notify(&format!(
            "Harmonization complete! {} stories across {} epics. Check harmonization report for details.",
            report.summary.total_stories, report.summary.total_epics
        ));

        Ok(HarmonizeSummary {
            backup_path,
            phases,
            report_path: report_path.to_path_buf(),
            report,
        })
    }

    fn run_phase(&self, phase: Phase, apply: PhaseFn, ctx: &PhaseContext) -> Result<PhaseResult> {
        info!("=== PHASE {}: {} ===", phase.number(), phase.headline());
        self.notifier.notify(&format!(
            "Starting phase {}: {}",
            phase.number(),
            phase.headline()
        ));

        let before = DocTree::scan(self.layout)?;
        let outcome = apply(before.clone(), ctx)?;
        let stats = outcome.tree.commit(&before, self.layout)?;

        let message = completion_message(phase, outcome.changed);
        info!(
            written = stats.written,
            removed = stats.removed,
            "Phase {} Complete: {message}",
            phase.number()
        );
        self.notifier
            .notify(&format!("Phase {} complete. {message}", phase.number()));

        Ok(PhaseResult {
            phase,
            changed: outcome.changed,
        })
    }

    /// Phase 5 alone: rescan, build the report and write it. Epic and story
    /// files are left as they are.
    pub fn report(&self, report_path: &Path, now: DateTime<Utc>) -> Result<HarmonizationReport> {
        let phase = Phase::Report;
        info!("=== PHASE {}: {} ===", phase.number(), phase.headline());
        self.notifier.notify(&format!(
            "Starting phase {}: {}",
            phase.number(),
            phase.headline()
        ));

        let tree = DocTree::scan(self.layout)?;
        let report = report::build(&tree, self.config, now);
        io::atomic_write(report_path, report::render(&report).as_bytes())?;

        info!("Phase {} Complete: {}", phase.number(), completion_message(phase, 0));
        info!(
            "Total Epics: {}, Total Stories: {}",
            report.summary.total_epics, report.summary.total_stories
        );
        self.notifier.notify(&format!(
            "Phase {} complete. Total epics: {}, Total stories: {}",
            phase.number(),
            report.summary.total_epics,
            report.summary.total_stories
        ));
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Backup
// ---------------------------------------------------------------------------

/// Copy `epics/` (required) and `stories/` (if present) into a fresh
/// timestamped directory under `backups/`.
pub fn backup(layout: &Layout, now: DateTime<Utc>) -> Result<PathBuf> {
    let epics = layout.epics_dir();
    if !epics.is_dir() {
        return Err(ForgeError::MissingDirectory(epics));
    }
    let target = layout.backup_dir(now);
    io::ensure_dir(&target)?;
    let mut copied = io::copy_tree(&epics, &target.join(EPICS_DIR))?;
    let stories = layout.stories_dir();
    if stories.is_dir() {
        copied += io::copy_tree(&stories, &target.join(STORIES_DIR))?;
    }
    info!(files = copied, "Created backup at {}", target.display());
    Ok(target)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotifier;
    use crate::sections::default_sections;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct Recorder(RefCell<Vec<String>>);

    impl Notifier for Recorder {
        fn notify(&self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 10, 20, 30).unwrap()
    }

    fn docs_with_epic(name: &str, body: &str) -> (TempDir, Layout) {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path().join("project_documentation"));
        std::fs::create_dir_all(layout.epics_dir()).unwrap();
        std::fs::write(layout.epic_path(name), body).unwrap();
        (dir, layout)
    }

    #[test]
    fn missing_epics_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        let err = backup(&layout, now()).unwrap_err();
        assert!(matches!(err, ForgeError::MissingDirectory(_)));
    }

    #[test]
    fn backup_copies_epics_and_optional_stories() {
        let (_dir, layout) = docs_with_epic("EPIC-001-a.md", "# A\n");
        let path = backup(&layout, now()).unwrap();
        assert!(path.ends_with("backups/backup-2025-03-04T10-20-30-000Z"));
        assert!(path.join("epics/EPIC-001-a.md").exists());
        assert!(!path.join("stories").exists());
    }

    #[test]
    fn full_run_splits_creates_links_and_reports() {
        let (dir, layout) = docs_with_epic("EPIC-099-foo.md", "# Foo Experience\n\nSee [STORY-101].\n");
        let config = HarmonizeConfig::default();
        let sections = default_sections();
        let recorder = Recorder(RefCell::new(Vec::new()));
        let report_path = dir.path().join("harmonization-report.md");

        let summary = Harmonizer::new(&layout, &config, &sections, &recorder)
            .run(&report_path, now())
            .unwrap();

        let changed: Vec<usize> = summary.phases.iter().map(|p| p.changed).collect();
        // 1 split, 10 stories (5 per side), nothing short, 3 epics + 0 backlinks
        assert_eq!(changed, vec![1, 10, 0, 3]);
        let archived = std::fs::read_to_string(layout.epic_path("EPIC-099-foo-SPLIT.md")).unwrap();
        assert!(archived.contains("## Stories"));
        assert!(layout.epic_path("EPIC-099-foo-SPLIT.md").exists());
        assert!(layout
            .story_path("STORY-099A-001-core-component-setup.md")
            .exists());
        let frontend = std::fs::read_to_string(layout.epic_path("EPIC-099A-foo-frontend.md")).unwrap();
        assert!(frontend.contains("## Stories"));
        assert!(frontend.contains(
            "- [STORY-099A-001-core-component-setup](../stories/STORY-099A-001-core-component-setup.md)"
        ));
        assert_eq!(summary.report.summary.total_epics, 2);
        assert_eq!(summary.report.summary.total_stories, 10);
        assert!(report_path.exists());

        let messages = recorder.0.borrow();
        assert_eq!(messages.first().unwrap(), "Starting epic and story harmonization process");
        assert!(messages.iter().any(|m| m == "Phase 2 complete. Created 10 new stories"));
    }

    #[test]
    fn second_run_is_quiet() {
        let (dir, layout) = docs_with_epic("EPIC-099-foo.md", "# Foo\n");
        let config = HarmonizeConfig::default();
        let sections = default_sections();
        let report_path = dir.path().join("report.md");
        let harmonizer = Harmonizer::new(&layout, &config, &sections, &NoopNotifier);
        harmonizer.run(&report_path, now()).unwrap();

        let later = now() + chrono::Duration::seconds(1);
        let summary = harmonizer.run(&report_path, later).unwrap();
        let changed: Vec<usize> = summary.phases.iter().map(|p| p.changed).collect();
        assert_eq!(changed, vec![0, 0, 0, 0]);
    }

    #[test]
    fn report_only_leaves_documents_alone() {
        let (dir, layout) = docs_with_epic("EPIC-099-foo.md", "# Foo\n");
        let config = HarmonizeConfig::default();
        let sections = default_sections();
        let report_path = dir.path().join("report.md");
        let report = Harmonizer::new(&layout, &config, &sections, &NoopNotifier)
            .report(&report_path, now())
            .unwrap();
        assert_eq!(report.summary.total_epics, 1);
        assert!(layout.epic_path("EPIC-099-foo.md").exists());
        assert!(!layout.backups_dir().exists());
    }
}
