use crate::error::Result;
use crate::io::{self, Materialized};
use crate::paths::{Layout, EPIC_PREFIX, STORY_PREFIX};
use std::collections::BTreeMap;

/// In-memory copy of `epics/` and `stories/`, keyed by file name.
///
/// Phases transform a tree; [`DocTree::commit`] writes back whatever
/// differs from the tree that was scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocTree {
    pub epics: BTreeMap<String, String>,
    pub stories: BTreeMap<String, String>,
}

/// Files written and removed by a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub written: usize,
    pub removed: usize,
}

impl DocTree {
    /// Read every `EPIC-*.md` and `STORY-*.md` under the layout. A missing
    /// directory reads as empty.
    pub fn scan(layout: &Layout) -> Result<Self> {
        Ok(Self {
            epics: read_all(&layout.epics_dir(), EPIC_PREFIX)?,
            stories: read_all(&layout.stories_dir(), STORY_PREFIX)?,
        })
    }

    /// Write new or changed entries and delete entries that disappeared
    /// since `before`.
    pub fn commit(&self, before: &DocTree, layout: &Layout) -> Result<CommitStats> {
        let mut stats = CommitStats::default();
        for (dir, now, then) in [
            (layout.epics_dir(), &self.epics, &before.epics),
            (layout.stories_dir(), &self.stories, &before.stories),
        ] {
            for (name, content) in now {
                if then.get(name) != Some(content) {
                    io::atomic_write(&dir.join(name), content.as_bytes())?;
                    stats.written += 1;
                }
            }
            for name in then.keys().filter(|n| !now.contains_key(*n)) {
                let path = dir.join(name);
                if path.exists() {
                    std::fs::remove_file(&path)?;
                }
                stats.removed += 1;
            }
        }
        Ok(stats)
    }

    /// Insert a story only when no story of that name exists.
    pub fn materialize_story(&mut self, name: String, content: String) -> Materialized {
        if self.stories.contains_key(&name) {
            return Materialized::Skipped;
        }
        self.stories.insert(name, content);
        Materialized::Created
    }
}

fn read_all(dir: &std::path::Path, prefix: &str) -> Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();
    for name in io::list_markdown(dir, prefix)? {
        let content = std::fs::read_to_string(dir.join(&name))?;
        files.insert(name, content);
    }
    Ok(files)
}
