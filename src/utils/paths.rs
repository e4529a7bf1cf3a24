//! Path helpers for the candidate and corpus roots.

use crate::error::{OrphanError, Result};
use std::path::{Path, PathBuf};

/// Rewrite every platform separator to `/`
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Resolve a root directory given on the command line.
///
/// `role` names the root in error messages ("candidate root", "corpus root").
pub fn resolve_root(path: &Path, role: &str) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(OrphanError::Configuration(format!("{} path is empty", role)));
    }

    let root = path.canonicalize().map_err(|e| {
        OrphanError::Configuration(format!("{} {} is not accessible: {}", role, path.display(), e))
    })?;

    if !root.is_dir() {
        return Err(OrphanError::Configuration(format!(
            "{} {} is not a directory",
            role,
            path.display()
        )));
    }

    Ok(root)
}

/// True when `path` lies at or below `root`, compared segment by segment.
///
/// `docs/assets-old` is not within `docs/assets`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Path of `file` relative to `root`, with `/` separators
pub fn relative_slash_path(root: &Path, file: &Path) -> Result<String> {
    let rel = file.strip_prefix(root).map_err(|_| {
        OrphanError::Configuration(format!(
            "{} is not under {}",
            file.display(),
            root.display()
        ))
    })?;

    let rel = normalize_separators(&rel.to_string_lossy());
    if rel.is_empty() {
        return Err(OrphanError::Configuration(format!(
            "{} has an empty path relative to {}",
            file.display(),
            root.display()
        )));
    }

    Ok(rel)
}
