use std::path::{Path, PathBuf};

pub const DOCS_DIR_NAME: &str = "project_documentation";

/// Resolve the documentation root.
///
/// Priority:
/// 1. `--docs` flag / `PROJECT_DOCS` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `project_documentation/`
/// 3. Fall back to `./project_documentation`
pub fn resolve_docs_root(explicit: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(explicit, &cwd)
}

fn resolve_from(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    cwd.ancestors()
        .map(|dir| dir.join(DOCS_DIR_NAME))
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| cwd.join(DOCS_DIR_NAME))
}
