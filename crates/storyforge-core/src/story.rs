use crate::ids;
use crate::types::StoryType;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Title given to a story whose heading can't be read back.
pub const FALLBACK_TITLE: &str = "Story Implementation";

static STORY_HEADING_RE: OnceLock<Regex> = OnceLock::new();

fn story_heading_re() -> &'static Regex {
    STORY_HEADING_RE.get_or_init(|| {
        Regex::new(r"(?m)^#[ \t]+STORY-\d+[AB]?(?:-\d+)?:[ \t]+(.+?)[ \t]*$").unwrap()
    })
}

/// Title from a `# STORY-…: <title>` heading, if the story has one.
pub fn heading_title(content: &str) -> Option<String> {
    story_heading_re()
        .captures(content)
        .map(|caps| caps[1].to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryDescriptor {
    /// Opaque: catalog ids are kept exactly as listed.
    pub id: String,
    pub title: String,
    pub kind: StoryType,
    pub parent_epic_id: String,
}

impl StoryDescriptor {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: StoryType,
        parent_epic_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            parent_epic_id: parent_epic_id.into(),
        }
    }

    /// Rebuild a descriptor from an existing story body. The kind is not
    /// recorded in the document, so it comes back as a feature.
    pub fn from_existing(id: impl Into<String>, content: &str, parent_epic_id: &str) -> Self {
        let title = heading_title(content).unwrap_or_else(|| FALLBACK_TITLE.to_string());
        Self::new(id, title, StoryType::Feature, parent_epic_id)
    }

    pub fn file_name(&self) -> String {
        ids::story_file_name(&self.id, &self.title)
    }
}
