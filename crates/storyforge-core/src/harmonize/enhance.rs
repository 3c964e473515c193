//! Phase 3: regenerate stories that fall short of the line threshold.
//!
//! This is the one phase that overwrites existing content. Every overwrite is
//! logged at WARN so manual edits that get replaced leave a trace.

use super::{PhaseContext, PhaseOutcome};
use crate::epic::EpicDescriptor;
use crate::error::Result;
use crate::ids::StoryId;
use crate::io;
use crate::snapshot::DocTree;
use crate::story::StoryDescriptor;
use crate::template;
use tracing::{debug, warn};

pub fn apply(mut tree: DocTree, ctx: &PhaseContext) -> Result<PhaseOutcome> {
    let epics: Vec<EpicDescriptor> = tree
        .epics
        .iter()
        .map(|(name, content)| EpicDescriptor::parse(name, content))
        .filter(|e| !e.is_archived())
        .collect();

    let mut rewrites = Vec::new();
    for (file_name, content) in &tree.stories {
        let lines = io::line_count(content);
        if lines >= ctx.config.min_story_lines {
            continue;
        }
        let Some(id) = StoryId::from_file_name(file_name) else {
            debug!("{file_name} has no story id; leaving it");
            continue;
        };
        let Some(epic) = epics
            .iter()
            .find(|e| e.story_key().as_ref() == Some(&id.key))
        else {
            debug!("no epic for {file_name}; leaving it");
            continue;
        };

        let story = StoryDescriptor::from_existing(id.to_string(), content, &epic.display_id());
        let rendered = template::render_story(&story, epic, ctx.sections, ctx.config, ctx.now)?;
        warn!(
            lines,
            threshold = ctx.config.min_story_lines,
            "Enhancing {file_name}: overwriting with regenerated content"
        );
        rewrites.push((file_name.clone(), rendered));
    }

    let changed = rewrites.len();
    tree.stories.extend(rewrites);
    Ok(PhaseOutcome { tree, changed })
}
