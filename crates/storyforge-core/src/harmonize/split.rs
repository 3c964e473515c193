//! Phase 1: split full-stack epics into frontend and backend halves.

use super::{PhaseContext, PhaseOutcome};
use crate::config::HarmonizeConfig;
use crate::epic::{self, EpicDescriptor};
use crate::error::Result;
use crate::snapshot::DocTree;
use crate::types::EpicSide;
use std::collections::btree_map::Entry;
use tracing::{info, warn};

/// Full-stack, has an id, not archived, and clear of every exclusion keyword.
pub fn is_splittable(epic: &EpicDescriptor, config: &HarmonizeConfig) -> bool {
    !epic.is_archived()
        && epic.id.is_some()
        && epic.side == EpicSide::FullStack
        && !config.excludes_from_split(&epic.file_name)
}

pub fn apply(mut tree: DocTree, ctx: &PhaseContext) -> Result<PhaseOutcome> {
    let candidates: Vec<(String, String)> = tree
        .epics
        .iter()
        .map(|(name, content)| (name.clone(), content.clone()))
        .collect();

    let mut changed = 0;
    for (name, content) in candidates {
        let parsed = EpicDescriptor::parse(&name, &content);
        if !is_splittable(&parsed, ctx.config) {
            continue;
        }
        let Some(key) = parsed.id.as_ref() else {
            continue;
        };

        info!("Splitting {name} into Frontend and Backend epics");
        let names = epic::split_names(&name, key);
        for (file, side) in [
            (names.frontend, EpicSide::Frontend),
            (names.backend, EpicSide::Backend),
        ] {
            match tree.epics.entry(file) {
                Entry::Vacant(slot) => {
                    slot.insert(epic::side_variant(&parsed, &content, side));
                }
                Entry::Occupied(existing) => {
                    warn!("{} already exists; keeping it", existing.key());
                }
            }
        }

        tree.epics.remove(&name);
        tree.epics.insert(names.archived, content);
        changed += 1;
    }

    Ok(PhaseOutcome { tree, changed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::default_sections;
    use chrono::Utc;

    fn run(tree: DocTree) -> PhaseOutcome {
        let config = HarmonizeConfig::default();
        let sections = default_sections();
        let ctx = PhaseContext {
            config: &config,
            sections: &sections,
            now: Utc::now(),
        };
        apply(tree, &ctx).unwrap()
    }

    fn tree_of(epics: &[(&str, &str)]) -> DocTree {
        DocTree {
            epics: epics
                .iter()
                .map(|(n, c)| (n.to_string(), c.to_string()))
                .collect(),
            ..DocTree::default()
        }
    }

    #[test]
    fn full_stack_epic_is_split_and_archived() {
        let out = run(tree_of(&[("EPIC-099-foo.md", "# Foo\n[STORY-101]\n")]));
        assert_eq!(out.changed, 1);
        let names: Vec<&str> = out.tree.epics.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["EPIC-099-foo-SPLIT.md", "EPIC-099A-foo-frontend.md", "EPIC-099B-foo-backend.md"]
        );
        assert_eq!(out.tree.epics["EPIC-099-foo-SPLIT.md"], "# Foo\n[STORY-101]\n");
        assert!(out.tree.epics["EPIC-099B-foo-backend.md"].contains("[STORY-101B]"));
    }

    #[test]
    fn excluded_sided_and_anonymous_epics_stay_put() {
        let epics = [
            ("EPIC-005-ai-infrastructure.md", "# AI\n"),
            ("EPIC-001A-timeline.md", "# T\n"),
            ("EPIC-002-search-backend.md", "# S\n"),
            ("EPIC-notes.md", "# N\n"),
            ("EPIC-098-old-SPLIT.md", "# Old\n"),
        ];
        let before = tree_of(&epics);
        let out = run(before.clone());
        assert_eq!(out.changed, 0);
        assert_eq!(out.tree, before);
    }

    #[test]
    fn existing_variant_is_not_overwritten() {
        let out = run(tree_of(&[
            ("EPIC-099-foo.md", "# Foo\n"),
            ("EPIC-099A-foo-frontend.md", "hand written"),
        ]));
        assert_eq!(out.tree.epics["EPIC-099A-foo-frontend.md"], "hand written");
        assert!(out.tree.epics.contains_key("EPIC-099B-foo-backend.md"));
        assert!(!out.tree.epics.contains_key("EPIC-099-foo.md"));
    }
}
