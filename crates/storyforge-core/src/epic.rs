use crate::ids::{self, EpicKey};
use crate::paths;
use crate::types::{EpicSide, EpicType};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static H1_RE: OnceLock<Regex> = OnceLock::new();
static STORY_REF_RE: OnceLock<Regex> = OnceLock::new();
static BARE_STORY_REF_RE: OnceLock<Regex> = OnceLock::new();

fn h1_re() -> &'static Regex {
    H1_RE.get_or_init(|| Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap())
}

fn story_ref_re() -> &'static Regex {
    STORY_REF_RE.get_or_init(|| Regex::new(r"\[(STORY-\d+[AB]?(?:-\d+)?)\]").unwrap())
}

fn bare_story_ref_re() -> &'static Regex {
    BARE_STORY_REF_RE.get_or_init(|| Regex::new(r"\[STORY-(\d+)\]").unwrap())
}

/// Title from the first level-one heading, if any.
pub fn heading_title(content: &str) -> Option<String> {
    h1_re()
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
}

/// Every `[STORY-…]` reference in `content`, deduplicated.
pub fn story_references(content: &str) -> BTreeSet<String> {
    story_ref_re()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// EpicDescriptor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpicDescriptor {
    pub file_name: String,
    /// `None` when the file name carries no `EPIC-<digits>` id.
    pub id: Option<EpicKey>,
    pub title: String,
    pub side: EpicSide,
    pub kind: EpicType,
    pub story_refs: BTreeSet<String>,
}

impl EpicDescriptor {
    /// Describe an epic file from its name and body.
    pub fn parse(file_name: &str, content: &str) -> Self {
        let id = ids::epic_key_from_file_name(file_name);
        let lower = file_name.to_lowercase();
        let side = id
            .as_ref()
            .and_then(|k| EpicSide::from_suffix(k.suffix))
            .unwrap_or(if lower.contains("frontend") {
                EpicSide::Frontend
            } else if lower.contains("backend") {
                EpicSide::Backend
            } else {
                EpicSide::FullStack
            });

        Self {
            file_name: file_name.to_string(),
            id,
            title: heading_title(content).unwrap_or_else(|| file_name.to_string()),
            side,
            kind: EpicType::from_name(file_name),
            story_refs: story_references(content),
        }
    }

    /// Describe a catalog epic that may not exist on disk yet.
    pub fn from_catalog(key: EpicKey, name: &str) -> Self {
        let epic_id = key.epic_id();
        let file_name = ids::epic_file_name(&epic_id, name);
        let side = EpicSide::from_suffix(key.suffix).unwrap_or(EpicSide::FullStack);
        Self {
            kind: EpicType::from_name(name),
            file_name,
            id: Some(key),
            title: name.to_string(),
            side,
            story_refs: BTreeSet::new(),
        }
    }

    pub fn is_frontend(&self) -> bool {
        self.side == EpicSide::Frontend
    }

    pub fn is_backend(&self) -> bool {
        self.side == EpicSide::Backend
    }

    pub fn is_archived(&self) -> bool {
        paths::is_archived_epic(&self.file_name)
    }

    /// The key its stories are numbered under: id digits plus side suffix.
    pub fn story_key(&self) -> Option<EpicKey> {
        self.id
            .as_ref()
            .map(|k| EpicKey::new(k.number.clone(), self.side))
    }

    /// `EPIC-001A`, or the file name when no id is present.
    pub fn display_id(&self) -> String {
        self.id
            .as_ref()
            .map(|k| k.epic_id())
            .unwrap_or_else(|| self.file_name.clone())
    }
}

// ---------------------------------------------------------------------------
// Splitting full-stack epics
// ---------------------------------------------------------------------------

const FRONTEND_SECTIONS: &str = "
## UI Components
- Component architecture and hierarchy
- Reusable component library
- Component documentation

## State Management
- Global state architecture
- Local component state
- State persistence strategy

## User Experience
- Responsive design implementation
- Accessibility standards
- Performance optimization
- Progressive enhancement
";

const BACKEND_SECTIONS: &str = "
## API Design
- RESTful endpoint structure
- GraphQL schema design
- API versioning strategy
- Rate limiting and throttling

## Data Architecture
- Database schema design
- Data access patterns
- Query optimization
- Data validation rules

## Service Architecture
- Microservice boundaries
- Service communication
- Event-driven patterns
- Error handling strategy

## Infrastructure
- Deployment architecture
- Scaling strategy
- Monitoring and logging
- Performance optimization
";

/// File names produced by splitting `file_name`: frontend, backend, archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitNames {
    pub frontend: String,
    pub backend: String,
    pub archived: String,
}

/// `EPIC-099-foo.md` -> `EPIC-099A-foo-frontend.md`, `EPIC-099B-foo-backend.md`,
/// `EPIC-099-foo-SPLIT.md`.
pub fn split_names(file_name: &str, key: &EpicKey) -> SplitNames {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let id = key.epic_id();
    let rest = stem
        .find(&id)
        .map(|pos| &stem[pos + id.len()..])
        .unwrap_or("");
    SplitNames {
        frontend: format!("{id}A{rest}-frontend.md"),
        backend: format!("{id}B{rest}-backend.md"),
        archived: format!("{stem}{}", paths::ARCHIVED_SUFFIX),
    }
}

/// Body of the frontend or backend half of a full-stack epic.
pub fn side_variant(epic: &EpicDescriptor, content: &str, side: EpicSide) -> String {
    let (marker, sections) = match side {
        EpicSide::Frontend => ("## UI Components", FRONTEND_SECTIONS),
        EpicSide::Backend => ("## API Design", BACKEND_SECTIONS),
        EpicSide::FullStack => return content.to_string(),
    };

    let heading = format!("# {} - {}", epic.title, side.label());
    let retitled = if h1_re().is_match(content) {
        h1_re()
            .replace(content, regex::NoExpand(heading.as_str()))
            .into_owned()
    } else {
        format!("{heading}\n\n{content}")
    };
    let replacement = format!("[STORY-${{1}}{}]", side.suffix());
    let mut body = bare_story_ref_re()
        .replace_all(&retitled, replacement.as_str())
        .into_owned();

    if !body.contains(marker) {
        body.push_str(sections);
    }
    body
}
