//! Identifier and file-name derivation for epics and stories.
//!
//! Every name produced here is a pure function of its inputs. Story file
//! names double as the idempotency key: a file at the derived path means the
//! story has been created.

use crate::error::{ForgeError, Result};
use crate::paths::{EPIC_PREFIX, STORY_PREFIX};
use crate::types::EpicSide;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Slugs and name casings
// ---------------------------------------------------------------------------

/// Lowercase, collapse whitespace runs to `-`, drop anything outside `[a-z0-9-]`.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let mut hyphenated = String::with_capacity(lower.len());
    let mut in_space = false;
    for c in lower.chars() {
        if c.is_whitespace() {
            if !in_space {
                hyphenated.push('-');
            }
            in_space = true;
        } else {
            hyphenated.push(c);
            in_space = false;
        }
    }
    hyphenated
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

fn words(title: &str) -> impl Iterator<Item = &str> {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// `Event Search Interface` -> `EventSearchInterface`.
pub fn pascal_case(title: &str) -> String {
    words(title)
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `Event Search Interface` -> `event_search_interface`.
pub fn snake_case(title: &str) -> String {
    words(title)
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `Event Search Interface` -> `eventsearchinterface`.
pub fn flat_case(title: &str) -> String {
    words(title).map(|w| w.to_ascii_lowercase()).collect()
}

// ---------------------------------------------------------------------------
// EpicKey
// ---------------------------------------------------------------------------

/// Digits plus optional side suffix, e.g. `001A`. Stories carry the key of
/// the epic they belong to right after `STORY-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpicKey {
    pub number: String,
    pub suffix: Option<char>,
}

impl EpicKey {
    pub fn new(number: impl Into<String>, side: EpicSide) -> Self {
        let suffix = match side {
            EpicSide::Frontend => Some('A'),
            EpicSide::Backend => Some('B'),
            EpicSide::FullStack => None,
        };
        Self {
            number: number.into(),
            suffix,
        }
    }

    /// Parse `EPIC-001A` (or bare `001A`).
    pub fn parse_epic_id(id: &str) -> Result<Self> {
        let bare = id.strip_prefix(EPIC_PREFIX).unwrap_or(id);
        let caps = key_re()
            .captures(bare)
            .ok_or_else(|| ForgeError::InvalidEpicId(id.to_string()))?;
        Ok(Self::from_captures(&caps))
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Self {
        Self {
            number: caps[1].to_string(),
            suffix: caps.get(2).and_then(|m| m.as_str().chars().next()),
        }
    }

    pub fn epic_id(&self) -> String {
        format!("{EPIC_PREFIX}{self}")
    }
}

impl fmt::Display for EpicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.number)?;
        if let Some(s) = self.suffix {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

impl Serialize for EpicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

static KEY_RE: OnceLock<Regex> = OnceLock::new();
static EPIC_FILE_RE: OnceLock<Regex> = OnceLock::new();
static STORY_FILE_RE: OnceLock<Regex> = OnceLock::new();
static STORY_ID_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^(\d+)([AB])?$").unwrap())
}

fn epic_file_re() -> &'static Regex {
    EPIC_FILE_RE.get_or_init(|| Regex::new(r"EPIC-(\d+)([AB])?").unwrap())
}

fn story_file_re() -> &'static Regex {
    STORY_FILE_RE.get_or_init(|| Regex::new(r"^STORY-(\d+)([AB])?(?:-(\d{3}))?").unwrap())
}

fn story_id_re() -> &'static Regex {
    STORY_ID_RE.get_or_init(|| Regex::new(r"^STORY-(\d+)([AB])?(?:-(\d{3}))?$").unwrap())
}

/// The `EPIC-…` id embedded in an epic file name, if any.
pub fn epic_key_from_file_name(file_name: &str) -> Option<EpicKey> {
    epic_file_re()
        .captures(file_name)
        .map(|caps| EpicKey::from_captures(&caps))
}

// ---------------------------------------------------------------------------
// StoryId
// ---------------------------------------------------------------------------

/// `STORY-001A`, or `STORY-099B-003` for stories synthesized under an epic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoryId {
    pub key: EpicKey,
    pub ordinal: Option<u32>,
}

impl StoryId {
    pub fn parse(id: &str) -> Result<Self> {
        let caps = story_id_re()
            .captures(id)
            .ok_or_else(|| ForgeError::InvalidStoryId(id.to_string()))?;
        Ok(Self::from_captures(&caps))
    }

    /// Leading story id of a file name such as `STORY-001A-basic-scroll.md`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        story_file_re()
            .captures(file_name)
            .map(|caps| Self::from_captures(&caps))
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Self {
        Self {
            key: EpicKey::from_captures(caps),
            ordinal: caps.get(3).and_then(|m| m.as_str().parse().ok()),
        }
    }

    /// The `ordinal`-th synthesized story under `epic`.
    pub fn sub_story(epic: &EpicKey, ordinal: u32) -> Self {
        Self {
            key: epic.clone(),
            ordinal: Some(ordinal),
        }
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{STORY_PREFIX}{}", self.key)?;
        if let Some(n) = self.ordinal {
            write!(f, "-{n:03}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

pub fn story_file_name(id: &str, title: &str) -> String {
    format!("{id}-{}.md", slugify(title))
}

pub fn epic_file_name(id: &str, name: &str) -> String {
    format!("{id}-{}.md", slugify(name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_strips() {
        assert_eq!(slugify("Basic horizontal timeline scroll"), "basic-horizontal-timeline-scroll");
        assert_eq!(slugify("Error handling & recovery"), "error-handling--recovery");
        assert_eq!(slugify("Single sign-on (SSO)"), "single-sign-on-sso");
        assert_eq!(slugify("  Login/Register   Forms "), "-loginregister-forms-");
    }

    #[test]
    fn slugify_is_stable_and_safe() {
        for title in [
            "Timeline API endpoints",
            "Llama3 13b deployment",
            "Import/export API",
            "Cache monitoring & alerts",
            "Données été",
        ] {
            let a = slugify(title);
            assert_eq!(a, slugify(title));
            assert!(
                a.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "unsafe slug: {a}"
            );
        }
    }

    #[test]
    fn name_casings() {
        assert_eq!(pascal_case("Login/Register Forms"), "LoginRegisterForms");
        assert_eq!(snake_case("Event Data Caching"), "event_data_caching");
        assert_eq!(flat_case("Event Data Caching"), "eventdatacaching");
    }

    #[test]
    fn epic_keys_from_file_names() {
        let key = epic_key_from_file_name("EPIC-001A-timeline.md").unwrap();
        assert_eq!(key.to_string(), "001A");
        assert_eq!(key.epic_id(), "EPIC-001A");
        let key = epic_key_from_file_name("EPIC-099-foo.md").unwrap();
        assert_eq!(key.suffix, None);
        assert!(epic_key_from_file_name("README.md").is_none());
    }

    #[test]
    fn parse_epic_id_rejects_garbage() {
        assert!(EpicKey::parse_epic_id("EPIC-016B").is_ok());
        assert!(EpicKey::parse_epic_id("EPIC-X").is_err());
        assert!(EpicKey::parse_epic_id("EPIC-016C").is_err());
    }

    #[test]
    fn story_ids_round_trip_through_display() {
        for id in ["STORY-001A", "STORY-043", "STORY-099B-003", "STORY-7-001"] {
            assert_eq!(StoryId::parse(id).unwrap().to_string(), id);
        }
        assert!(StoryId::parse("STORY-ABC").is_err());
    }

    #[test]
    fn story_id_from_file_name_ignores_slug() {
        let id = StoryId::from_file_name("STORY-001A-basic-horizontal-timeline-scroll.md").unwrap();
        assert_eq!(id.to_string(), "STORY-001A");
        let id = StoryId::from_file_name("STORY-099B-002-data-model-implementation.md").unwrap();
        assert_eq!(id.to_string(), "STORY-099B-002");
        assert_eq!(id.key.to_string(), "099B");
    }

    #[test]
    fn sub_story_ids_follow_epic_side() {
        let fe = EpicKey::new("099", EpicSide::Frontend);
        assert_eq!(StoryId::sub_story(&fe, 1).to_string(), "STORY-099A-001");
        let full = EpicKey::new("099", EpicSide::FullStack);
        assert_eq!(StoryId::sub_story(&full, 5).to_string(), "STORY-099-005");
    }

    #[test]
    fn file_names() {
        assert_eq!(
            story_file_name("STORY-001A", "Basic horizontal timeline scroll"),
            "STORY-001A-basic-horizontal-timeline-scroll.md"
        );
        assert_eq!(
            epic_file_name("EPIC-005", "AI Infrastructure"),
            "EPIC-005-ai-infrastructure.md"
        );
    }
}
