use crate::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Outcome of [`materialize`]: whether a document was written or left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Materialized {
    Created,
    Skipped,
}

/// Atomically write `data` to `path` using a tempfile in the same directory.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Write `content` to `path` only if nothing exists there yet.
///
/// Existing files are never read or diffed: presence alone means the
/// document was already created.
pub fn materialize(path: &Path, content: &str) -> Result<Materialized> {
    if path.exists() {
        return Ok(Materialized::Skipped);
    }
    atomic_write(path, content.as_bytes())?;
    Ok(Materialized::Created)
}

/// List the markdown files in `dir` whose names start with `prefix`,
/// sorted by name. A missing directory yields an empty list.
pub fn list_markdown(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(prefix) && name.ends_with(".md") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Recursively copy the tree at `from` into `to`, creating `to` as needed.
pub fn copy_tree(from: &Path, to: &Path) -> Result<u64> {
    let mut copied = 0;
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let dest = to.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &dest)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Line count as the documents measure it: newline-separated segments,
/// so a trailing newline adds one.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c/story.md");
        atomic_write(&path, b"data").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "data");
    }

    #[test]
    fn materialize_creates_then_skips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("STORY-001-a.md");
        assert_eq!(materialize(&path, "first").unwrap(), Materialized::Created);
        assert_eq!(materialize(&path, "second").unwrap(), Materialized::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn list_markdown_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["EPIC-002-b.md", "EPIC-001-a.md", "notes.md", "EPIC-003.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("EPIC-dir.md")).unwrap();
        let names = list_markdown(dir.path(), "EPIC-").unwrap();
        assert_eq!(names, vec!["EPIC-001-a.md", "EPIC-002-b.md"]);
    }

    #[test]
    fn list_markdown_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_markdown(&dir.path().join("nope"), "STORY-")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn copy_tree_copies_nested_files() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("a.md"), "a").unwrap();
        std::fs::write(src.join("nested/b.md"), "b").unwrap();
        let dest = dir.path().join("copy");
        assert_eq!(copy_tree(&src, &dest).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(dest.join("nested/b.md")).unwrap(), "b");
    }

    #[test]
    fn line_count_counts_trailing_segment() {
        assert_eq!(line_count("a\nb"), 2);
        assert_eq!(line_count("a\nb\n"), 3);
        assert_eq!(line_count(""), 1);
    }
}
