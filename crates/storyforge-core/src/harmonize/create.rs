//! Phase 2: give every epic its canonical batch of five stories.

use super::{PhaseContext, PhaseOutcome};
use crate::epic::EpicDescriptor;
use crate::error::Result;
use crate::ids::StoryId;
use crate::io::Materialized;
use crate::snapshot::DocTree;
use crate::story::StoryDescriptor;
use crate::template;
use crate::types::StoryType;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Story batches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Batch {
    Timeline,
    Event,
    Admin,
    Authentication,
    Default,
}

impl Batch {
    /// First keyword found in the epic file name wins.
    pub fn for_epic(file_name: &str) -> Batch {
        let lower = file_name.to_lowercase();
        [
            ("timeline", Batch::Timeline),
            ("event", Batch::Event),
            ("admin", Batch::Admin),
            ("auth", Batch::Authentication),
        ]
        .into_iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, b)| b)
        .unwrap_or(Batch::Default)
    }

    pub fn stories(self) -> [(&'static str, StoryType); 5] {
        use StoryType::*;
        match self {
            Batch::Timeline => [
                ("Timeline Component Architecture", Technical),
                ("Event Clustering Implementation", Feature),
                ("Timeline Navigation Controls", Feature),
                ("Density Visualization", Feature),
                ("Mobile Responsive Design", Technical),
            ],
            Batch::Event => [
                ("Event Search Interface", Feature),
                ("Event Filtering System", Feature),
                ("Event Detail Display", Feature),
                ("Event API Integration", Technical),
                ("Event Data Caching", Technical),
            ],
            Batch::Admin => [
                ("Admin Dashboard Layout", Feature),
                ("User Management Interface", Feature),
                ("Role Permission System", Technical),
                ("Admin API Endpoints", Technical),
                ("Audit Logging System", Technical),
            ],
            Batch::Authentication => [
                ("Login/Register Forms", Feature),
                ("JWT Token Management", Technical),
                ("OAuth Integration", Feature),
                ("Session Management", Technical),
                ("Password Reset Flow", Feature),
            ],
            Batch::Default => [
                ("Core Component Setup", Technical),
                ("Data Model Implementation", Technical),
                ("API Integration Layer", Technical),
                ("Testing Infrastructure", Technical),
                ("Documentation & Examples", Documentation),
            ],
        }
    }
}

/// The five stories an epic should have. Empty for epics without an id.
pub fn planned_stories(epic: &EpicDescriptor) -> Vec<StoryDescriptor> {
    let Some(key) = epic.story_key() else {
        return Vec::new();
    };
    Batch::for_epic(&epic.file_name)
        .stories()
        .into_iter()
        .zip(1u32..)
        .map(|((title, kind), n)| {
            StoryDescriptor::new(
                StoryId::sub_story(&key, n).to_string(),
                title,
                kind,
                epic.display_id(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

pub fn apply(mut tree: DocTree, ctx: &PhaseContext) -> Result<PhaseOutcome> {
    let epics: Vec<EpicDescriptor> = tree
        .epics
        .iter()
        .map(|(name, content)| EpicDescriptor::parse(name, content))
        .filter(|e| !e.is_archived() && e.id.is_some())
        .collect();

    let mut changed = 0;
    for epic in &epics {
        for story in planned_stories(epic) {
            let file_name = story.file_name();
            if tree.stories.contains_key(&file_name) {
                debug!("{file_name} already exists");
                continue;
            }
            let content = template::render_story(&story, epic, ctx.sections, ctx.config, ctx.now)?;
            if tree.materialize_story(file_name, content) == Materialized::Created {
                info!("Creating story {} for {}", story.id, epic.file_name);
                changed += 1;
            }
        }
    }

    Ok(PhaseOutcome { tree, changed })
}
