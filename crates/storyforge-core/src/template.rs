//! `{{name}}` placeholder rendering and story document assembly.
//!
//! Rendering is two-level: section fragments are rendered against the story
//! variables, then the story skeleton is rendered against the filled slots.
//! Substituted text is inserted verbatim and never rescanned, so titles that
//! happen to contain braces come through untouched.

use crate::config::HarmonizeConfig;
use crate::epic::EpicDescriptor;
use crate::error::{ForgeError, Result};
use crate::ids;
use crate::sections::{SectionContext, SectionTable, Slot};
use crate::story::StoryDescriptor;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

pub const STORY_TEMPLATE: &str = include_str!("../templates/story.md");

/// Variables a section fragment may reference.
pub const VARIABLES: &[&str] = &[
    "title",
    "title_lower",
    "pascal",
    "kebab",
    "snake",
    "flat",
    "story_id",
    "epic_key",
    "epic_title",
    "epic_file",
    "created",
];

/// Replace every `{{name}}` in `template` with `resolve(name)`.
///
/// A `{{` without a closing `}}` on the same line is an error; `resolve`
/// decides what an unknown name means.
pub fn render<F>(template: &str, mut resolve: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let name = after
            .find("}}")
            .map(|end| &after[..end])
            .filter(|name| !name.contains('\n'))
            .ok_or_else(|| {
                ForgeError::UnterminatedPlaceholder(rest[start..].chars().take(24).collect())
            })?;
        out.push_str(&resolve(name.trim())?);
        rest = &after[name.len() + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Story variables
// ---------------------------------------------------------------------------

fn story_variables(
    story: &StoryDescriptor,
    epic: &EpicDescriptor,
    now: DateTime<Utc>,
) -> BTreeMap<&'static str, String> {
    let epic_key = epic
        .story_key()
        .map(|k| k.to_string())
        .unwrap_or_default();
    BTreeMap::from([
        ("title", story.title.clone()),
        ("title_lower", story.title.to_lowercase()),
        ("pascal", ids::pascal_case(&story.title)),
        ("kebab", ids::slugify(&story.title)),
        ("snake", ids::snake_case(&story.title)),
        ("flat", ids::flat_case(&story.title)),
        ("story_id", story.id.clone()),
        ("epic_key", epic_key),
        ("epic_title", epic.title.clone()),
        ("epic_file", epic.file_name.clone()),
        ("created", now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    ])
}

fn scalar_slot(
    slot: Slot,
    story: &StoryDescriptor,
    epic: &EpicDescriptor,
    config: &HarmonizeConfig,
) -> Option<String> {
    match slot {
        Slot::Title => Some(format!("{}: {}", story.id, story.title)),
        Slot::EpicLink => Some(format!("[{0}](../epics/{0})", epic.file_name)),
        Slot::StoryType => Some(epic.side.label().to_string()),
        Slot::Priority => Some(config.priority.clone()),
        Slot::Effort => Some(config.effort.clone()),
        _ => None,
    }
}

/// Render the full story document. Pure apart from `now`, which is the only
/// time-dependent input.
pub fn render_story(
    story: &StoryDescriptor,
    epic: &EpicDescriptor,
    sections: &SectionTable,
    config: &HarmonizeConfig,
    now: DateTime<Utc>,
) -> Result<String> {
    let vars = story_variables(story, epic, now);
    let ctx = SectionContext::new(story, epic);

    let fill = |slot: Slot| -> Result<String> {
        if let Some(value) = scalar_slot(slot, story, epic, config) {
            return Ok(value);
        }
        let selection = sections
            .select(slot, &ctx)
            .ok_or_else(|| ForgeError::UnfilledSlot(slot.to_string()))?;
        render(selection.body, |name| {
            vars.get(name)
                .cloned()
                .ok_or_else(|| ForgeError::UnknownPlaceholder(name.to_string()))
        })
    };

    render(STORY_TEMPLATE, |name| {
        let slot =
            Slot::from_name(name).ok_or_else(|| ForgeError::UnknownPlaceholder(name.to_string()))?;
        fill(slot)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
