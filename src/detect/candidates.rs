use crate::error::{OrphanError, Result};
use crate::utils::{is_within, relative_slash_path};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// A file that may or may not be referenced by the corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full path, as it will be reported and deleted
    pub path: PathBuf,
    /// Path relative to the candidate root with `/` separators
    pub relative: String,
}

/// List files under the candidate root, sorted by path.
///
/// Directories in `excluded_dirs` (the index directory) are never entered.
/// With `recursive == false` only the top level is listed. Symbolic links
/// are listed as files themselves and never followed, so deleting an
/// orphaned link leaves its target alone.
pub fn discover_candidates(
    candidate_root: &Path,
    recursive: bool,
    excluded_dirs: &[PathBuf],
) -> Result<Vec<Candidate>> {
    let excluded = excluded_dirs.to_vec();
    let walker = WalkBuilder::new(candidate_root)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(if recursive { None } else { Some(1) })
        .filter_entry(move |entry| !excluded.iter().any(|dir| is_within(entry.path(), dir)))
        .build();

    let mut candidates = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            OrphanError::Configuration(format!(
                "cannot enumerate candidates under {}: {}",
                candidate_root.display(),
                e
            ))
        })?;

        if !entry.file_type().is_some_and(|t| t.is_file() || t.is_symlink()) {
            continue;
        }

        let path = entry.into_path();
        let relative = relative_slash_path(candidate_root, &path)?;
        candidates.push(Candidate { path, relative });
    }

    candidates.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(candidates)
}
