//! The epic → story catalog and the generator that materializes it.

use crate::config::HarmonizeConfig;
use crate::epic::EpicDescriptor;
use crate::error::{ForgeError, Result};
use crate::ids::{EpicKey, StoryId};
use crate::io::{self, Materialized};
use crate::paths::Layout;
use crate::sections::SectionTable;
use crate::story::StoryDescriptor;
use crate::template;
use crate::types::{EpicSide, StoryType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, info};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.yaml");

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: StoryType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEpic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stories: Vec<CatalogStory>,
}

impl CatalogEpic {
    pub fn key(&self) -> Result<EpicKey> {
        EpicKey::parse_epic_id(&self.id)
    }

    pub fn side(&self) -> EpicSide {
        self.key()
            .ok()
            .and_then(|k| EpicSide::from_suffix(k.suffix))
            .unwrap_or(EpicSide::FullStack)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub epics: Vec<CatalogEpic>,
}

impl Catalog {
    /// Parse and validate a catalog document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn story_count(&self) -> usize {
        self.epics.iter().map(|e| e.stories.len()).sum()
    }

    /// Epic and story ids must parse and story file names must be unique.
    /// Story ids are otherwise opaque: the same id under two titles is allowed.
    pub fn validate(&self) -> Result<()> {
        if self.epics.is_empty() {
            return Err(ForgeError::InvalidCatalog("no epics listed".to_string()));
        }
        let mut epic_ids = BTreeSet::new();
        let mut file_names = BTreeSet::new();
        for epic in &self.epics {
            epic.key()?;
            if !epic_ids.insert(epic.id.as_str()) {
                return Err(ForgeError::InvalidCatalog(format!(
                    "epic '{}' listed twice",
                    epic.id
                )));
            }
            for story in &epic.stories {
                if story.id.trim().is_empty() || story.title.trim().is_empty() {
                    return Err(ForgeError::InvalidCatalog(format!(
                        "story under '{}' has an empty id or title",
                        epic.id
                    )));
                }
                StoryId::parse(&story.id)?;
                let name = crate::ids::story_file_name(&story.id, &story.title);
                if !file_names.insert(name.clone()) {
                    return Err(ForgeError::InvalidCatalog(format!(
                        "duplicate story file '{name}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CatalogSource
// ---------------------------------------------------------------------------

/// Where a catalog comes from.
pub trait CatalogSource {
    fn load(&self) -> Result<Catalog>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// The table shipped with the binary.
pub struct BuiltinCatalog;

impl CatalogSource for BuiltinCatalog {
    fn load(&self) -> Result<Catalog> {
        Catalog::from_yaml(BUILTIN_CATALOG)
    }

    fn describe(&self) -> String {
        "built-in catalog".to_string()
    }
}

/// A catalog file on disk: JSON when the extension says so, YAML otherwise.
pub struct FileCatalog {
    pub path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self) -> Result<Catalog> {
        let text = std::fs::read_to_string(&self.path)?;
        match self.path.extension().and_then(|e| e.to_str()) {
            Some("json") => Catalog::from_json(&text),
            _ => Catalog::from_yaml(&text),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GenerateSummary {
    pub epics: usize,
    pub expected: usize,
    pub created: usize,
    pub skipped: usize,
    pub mapping_path: PathBuf,
}

/// Write every catalog story that has no file yet, then rewrite the mapping
/// document. Existing stories are never touched.
pub fn generate(
    catalog: &Catalog,
    layout: &Layout,
    sections: &SectionTable,
    config: &HarmonizeConfig,
    now: DateTime<Utc>,
) -> Result<GenerateSummary> {
    let expected = catalog.story_count();
    info!(
        "Starting generation of {expected} stories from {} epics",
        catalog.epics.len()
    );
    io::ensure_dir(&layout.stories_dir())?;

    let mut created = 0;
    let mut skipped = 0;
    for entry in &catalog.epics {
        info!("[EPIC] Processing {}: {}", entry.id, entry.name);
        debug!(stories = entry.stories.len(), "epic story count");
        let epic = EpicDescriptor::from_catalog(entry.key()?, &entry.name);

        for item in &entry.stories {
            let story = StoryDescriptor::new(&item.id, &item.title, item.kind, &entry.id);
            let file_name = story.file_name();
            let path = layout.story_path(&file_name);
            if path.exists() {
                info!("[SKIP] Story {} already exists: {file_name}", story.id);
                skipped += 1;
                continue;
            }
            let content = template::render_story(&story, &epic, sections, config, now)?;
            match io::materialize(&path, &content)? {
                Materialized::Created => {
                    info!("[CREATE] Creating story {}: {}", story.id, story.title);
                    created += 1;
                }
                Materialized::Skipped => skipped += 1,
            }
        }
    }

    let mapping_path = layout.mapping_path();
    io::atomic_write(&mapping_path, render_mapping(catalog).as_bytes())?;
    info!("[MAPPING] Wrote {}", mapping_path.display());

    Ok(GenerateSummary {
        epics: catalog.epics.len(),
        expected,
        created,
        skipped,
        mapping_path,
    })
}

// ---------------------------------------------------------------------------
// Mapping document
// ---------------------------------------------------------------------------

fn stories_on_side(catalog: &Catalog, side: EpicSide) -> usize {
    catalog
        .epics
        .iter()
        .filter(|e| e.side() == side)
        .map(|e| e.stories.len())
        .sum()
}

fn epic_listing(catalog: &Catalog, side: EpicSide) -> String {
    catalog
        .epics
        .iter()
        .filter(|e| e.side() == side)
        .map(|e| format!("- {}: {} ({} stories)", e.id, e.name, e.stories.len()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The story-to-epic cross reference: a row per story, totals by side and
/// the epics grouped by category.
pub fn render_mapping(catalog: &Catalog) -> String {
    let mut out = String::from(
        "# Story to Epic Mapping\n\n\
         This document maps all stories to their parent epics for easy reference.\n\n\
         ## Mapping Structure\n\n\
         | Story ID | Story Title | Parent Epic | Epic Name |\n\
         |----------|-------------|-------------|-----------|\n",
    );
    for epic in &catalog.epics {
        for story in &epic.stories {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                story.id, story.title, epic.id, epic.name
            );
        }
    }

    let _ = write!(
        out,
        "\n## Summary\n\n\
         - **Total Epics**: {}\n\
         - **Total Stories**: {}\n\
         - **Frontend Stories**: {}\n\
         - **Backend Stories**: {}\n\
         - **Full-stack Stories**: {}\n\n\
         ## Epic Categories\n\n\
         ### Frontend Epics (A)\n{}\n\n\
         ### Backend Epics (B)\n{}\n\n\
         ### Full-stack Epics\n{}\n",
        catalog.epics.len(),
        catalog.story_count(),
        stories_on_side(catalog, EpicSide::Frontend),
        stories_on_side(catalog, EpicSide::Backend),
        stories_on_side(catalog, EpicSide::FullStack),
        epic_listing(catalog, EpicSide::Frontend),
        epic_listing(catalog, EpicSide::Backend),
        epic_listing(catalog, EpicSide::FullStack),
    );
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::default_sections;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const SMALL: &str = r#"
epics:
  - id: EPIC-001A
    name: Timeline - Frontend
    stories:
      - { id: STORY-001A, title: Basic scroll }
      - { id: STORY-002A, title: Card display, kind: technical }
  - id: EPIC-004
    name: RAG Data
    stories:
      - { id: STORY-043, title: Pipeline setup }
"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = BuiltinCatalog.load().unwrap();
        assert_eq!(catalog.epics.len(), 25);
        assert_eq!(catalog.story_count(), 353);
    }

    #[test]
    fn duplicate_story_files_are_rejected() {
        let yaml = r#"
epics:
  - id: EPIC-001
    name: A
    stories:
      - { id: STORY-001, title: Same }
      - { id: STORY-001, title: Same }
"#;
        let err = Catalog::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ForgeError::InvalidCatalog(_)));
    }

    #[test]
    fn story_id_outside_the_id_pattern_is_rejected() {
        for id in ["../../escaped/STORY-1", "STORY-001/../x", "story-001", "STORY-001C"] {
            let yaml = format!(
                "epics:\n  - id: EPIC-001\n    name: A\n    stories:\n      - {{ id: \"{id}\", title: Pwn }}\n"
            );
            assert!(
                matches!(Catalog::from_yaml(&yaml).unwrap_err(), ForgeError::InvalidStoryId(_)),
                "accepted {id}"
            );
        }
        let sub = "epics:\n  - id: EPIC-001\n    name: A\n    stories:\n      - { id: STORY-099A-003, title: Ok }\n";
        assert!(Catalog::from_yaml(sub).is_ok());
    }

    #[test]
    fn bad_epic_id_is_rejected() {
        let yaml = "epics:\n  - id: EPIC-X\n    name: A\n";
        assert!(matches!(
            Catalog::from_yaml(yaml).unwrap_err(),
            ForgeError::InvalidEpicId(_)
        ));
    }

    #[test]
    fn file_catalog_loads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, SMALL).unwrap();
        let catalog = FileCatalog::new(&path).load().unwrap();
        assert_eq!(catalog.story_count(), 3);
        assert_eq!(catalog.epics[0].stories[1].kind, StoryType::Technical);
        assert_eq!(catalog.epics[0].stories[0].kind, StoryType::Feature);
    }

    #[test]
    fn json_catalog_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"epics":[{"id":"EPIC-010B","name":"Search API","stories":[{"id":"STORY-120B","title":"Query parser"}]}]}"#,
        )
        .unwrap();
        let catalog = FileCatalog::new(&path).load().unwrap();
        assert_eq!(catalog.story_count(), 1);
        assert_eq!(catalog.epics[0].side(), EpicSide::Backend);
    }

    #[test]
    fn generate_creates_then_skips() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path().join("docs"));
        let catalog = Catalog::from_yaml(SMALL).unwrap();
        let sections = default_sections();
        let config = HarmonizeConfig::default();

        let first = generate(&catalog, &layout, &sections, &config, now()).unwrap();
        assert_eq!((first.created, first.skipped), (3, 0));
        let story = layout.story_path("STORY-001A-basic-scroll.md");
        let content = std::fs::read_to_string(&story).unwrap();
        assert!(content.starts_with("# STORY-001A: Basic scroll\n"));
        assert!(content.contains("(../epics/EPIC-001A-timeline---frontend.md)"));
        assert!(layout.mapping_path().exists());

        std::fs::write(&story, "hand edited").unwrap();
        let second = generate(&catalog, &layout, &sections, &config, now()).unwrap();
        assert_eq!((second.created, second.skipped), (0, 3));
        assert_eq!(std::fs::read_to_string(&story).unwrap(), "hand edited");
    }

    #[test]
    fn mapping_lists_rows_totals_and_categories() {
        let catalog = Catalog::from_yaml(SMALL).unwrap();
        let doc = render_mapping(&catalog);
        assert!(doc.contains("| STORY-043 | Pipeline setup | EPIC-004 | RAG Data |"));
        assert!(doc.contains("- **Total Stories**: 3"));
        assert!(doc.contains("- **Frontend Stories**: 2"));
        assert!(doc.contains("- **Backend Stories**: 0"));
        assert!(doc.contains("- **Full-stack Stories**: 1"));
        assert!(doc.contains("### Frontend Epics (A)\n- EPIC-001A: Timeline - Frontend (2 stories)"));
        assert!(doc.contains("### Full-stack Epics\n- EPIC-004: RAG Data (1 stories)"));
    }
}
