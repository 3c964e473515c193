//! Phase 4: cross-reference epics and stories in both directions.

use super::{PhaseContext, PhaseOutcome};
use crate::epic::EpicDescriptor;
use crate::error::Result;
use crate::ids::StoryId;
use crate::snapshot::DocTree;
use regex::{NoExpand, Regex};
use std::sync::OnceLock;
use tracing::info;

const STORIES_HEADING: &str = "## Stories";

static EPIC_LINK_RE: OnceLock<Regex> = OnceLock::new();

fn epic_link_re() -> &'static Regex {
    EPIC_LINK_RE.get_or_init(|| Regex::new(r"\*\*Epic\*\*:\s*\[.*?\]\(.*?\)").unwrap())
}

/// Story file names whose key starts with the epic's key.
pub fn stories_for<'a>(epic: &EpicDescriptor, stories: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let Some(key) = epic.story_key().map(|k| k.to_string()) else {
        return Vec::new();
    };
    stories
        .filter(|name| {
            StoryId::from_file_name(name).is_some_and(|id| id.key.to_string().starts_with(&key))
        })
        .map(String::as_str)
        .collect()
}

/// The `## Stories` block appended to an epic.
pub fn stories_section(story_files: &[&str]) -> String {
    let lines: Vec<String> = story_files
        .iter()
        .map(|f| {
            let stem = f.strip_suffix(".md").unwrap_or(f);
            format!("- [{stem}](../stories/{f})")
        })
        .collect();
    format!("\n\n{STORIES_HEADING}\n\n{}\n", lines.join("\n"))
}

/// Point the story's `**Epic**:` line at `epic_file`. `None` when the story
/// already links it or has no such line.
pub fn relink_story(content: &str, epic_file: &str) -> Option<String> {
    if content.contains(&format!("[{epic_file}]")) {
        return None;
    }
    let link = format!("**Epic**: [{epic_file}](../epics/{epic_file})");
    let updated = epic_link_re().replace(content, NoExpand(&link));
    (updated != content).then(|| updated.into_owned())
}

pub fn apply(mut tree: DocTree, _ctx: &PhaseContext) -> Result<PhaseOutcome> {
    let epics: Vec<EpicDescriptor> = tree
        .epics
        .iter()
        .map(|(name, content)| EpicDescriptor::parse(name, content))
        .collect();

    let mut changed = 0;

    for epic in &epics {
        let Some(content) = tree.epics.get(&epic.file_name) else {
            continue;
        };
        if content.contains(STORIES_HEADING) {
            continue;
        }
        let listed = stories_for(epic, tree.stories.keys());
        let updated = format!("{content}{}", stories_section(&listed));
        info!(stories = listed.len(), "Linking stories into {}", epic.file_name);
        tree.epics.insert(epic.file_name.clone(), updated);
        changed += 1;
    }

    let mut relinked = Vec::new();
    for (file_name, content) in &tree.stories {
        let Some(id) = StoryId::from_file_name(file_name) else {
            continue;
        };
        // backlinks never point at a -SPLIT archive
        let Some(epic) = epics
            .iter()
            .filter(|e| !e.is_archived())
            .find(|e| e.story_key().as_ref() == Some(&id.key))
        else {
            continue;
        };
        if let Some(updated) = relink_story(content, &epic.file_name) {
            info!("Linking {file_name} back to {}", epic.file_name);
            relinked.push((file_name.clone(), updated));
        }
    }
    changed += relinked.len();
    tree.stories.extend(relinked);

    Ok(PhaseOutcome { tree, changed })
}
