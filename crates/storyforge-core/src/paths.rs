use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DEFAULT_DOCS_DIR: &str = "project_documentation";
pub const EPICS_DIR: &str = "epics";
pub const STORIES_DIR: &str = "stories";
pub const BACKUPS_DIR: &str = "backups";

pub const MAPPING_FILE: &str = "story-to-epic-mapping.md";
pub const HARMONIZE_CONFIG_FILE: &str = "harmonize.yaml";
pub const LOG_FILE: &str = "harmonization.log";
pub const REPORT_FILE: &str = "harmonization-report.md";

pub const EPIC_PREFIX: &str = "EPIC-";
pub const STORY_PREFIX: &str = "STORY-";
pub const ARCHIVED_SUFFIX: &str = "-SPLIT.md";

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// The documentation tree rooted at one docs directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn epics_dir(&self) -> PathBuf {
        self.root.join(EPICS_DIR)
    }

    pub fn stories_dir(&self) -> PathBuf {
        self.root.join(STORIES_DIR)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    pub fn epic_path(&self, file_name: &str) -> PathBuf {
        self.epics_dir().join(file_name)
    }

    pub fn story_path(&self, file_name: &str) -> PathBuf {
        self.stories_dir().join(file_name)
    }

    /// The mapping document lives beside `stories/`.
    pub fn mapping_path(&self) -> PathBuf {
        self.root.join(MAPPING_FILE)
    }

    pub fn harmonize_config_path(&self) -> PathBuf {
        self.root.join(HARMONIZE_CONFIG_FILE)
    }

    /// Default log location: next to the docs root, not inside it.
    pub fn default_log_path(&self) -> PathBuf {
        self.sibling(LOG_FILE)
    }

    pub fn default_report_path(&self) -> PathBuf {
        self.sibling(REPORT_FILE)
    }

    pub fn backup_dir(&self, at: DateTime<Utc>) -> PathBuf {
        self.backups_dir().join(backup_dir_name(at))
    }

    fn sibling(&self, name: &str) -> PathBuf {
        match self.root.parent() {
            Some(parent) => parent.join(name),
            None => self.root.join(name),
        }
    }
}

/// `backup-<ISO8601>` with `:` and `.` replaced so the name is portable.
pub fn backup_dir_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(|c: char| c == ':' || c == '.', "-");
    format!("backup-{stamp}")
}

pub fn is_archived_epic(file_name: &str) -> bool {
    file_name.ends_with(ARCHIVED_SUFFIX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn layout_paths() {
        let layout = Layout::new("/tmp/proj/docs");
        assert_eq!(layout.epics_dir(), PathBuf::from("/tmp/proj/docs/epics"));
        assert_eq!(
            layout.story_path("STORY-001A-x.md"),
            PathBuf::from("/tmp/proj/docs/stories/STORY-001A-x.md")
        );
        assert_eq!(
            layout.mapping_path(),
            PathBuf::from("/tmp/proj/docs/story-to-epic-mapping.md")
        );
        assert_eq!(
            layout.default_log_path(),
            PathBuf::from("/tmp/proj/harmonization.log")
        );
        assert_eq!(
            layout.default_report_path(),
            PathBuf::from("/tmp/proj/harmonization-report.md")
        );
    }

    #[test]
    fn backup_name_has_no_colons_or_dots() {
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 10, 20, 30).unwrap();
        assert_eq!(backup_dir_name(at), "backup-2025-03-04T10-20-30-000Z");
    }

    #[test]
    fn archived_epics_are_recognized() {
        assert!(is_archived_epic("EPIC-099-foo-SPLIT.md"));
        assert!(!is_archived_epic("EPIC-099A-foo-frontend.md"));
    }
}
