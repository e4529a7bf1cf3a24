use crate::detect::candidates::Candidate;
use crate::error::OrphanError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// What happened to one orphan
#[derive(Debug)]
pub enum DeletionOutcome {
    Deleted,
    Failed(OrphanError),
}

/// Remove a single file
pub fn delete_file(path: &Path) -> DeletionOutcome {
    match fs::remove_file(path) {
        Ok(()) => DeletionOutcome::Deleted,
        Err(source) => {
            let err = OrphanError::Deletion {
                path: path.to_path_buf(),
                source,
            };
            debug!("{}", err);
            DeletionOutcome::Failed(err)
        }
    }
}

/// Remove every orphan; a failure on one file does not stop the rest
pub fn delete_orphans<'c>(orphans: &[&'c Candidate]) -> Vec<(&'c Candidate, DeletionOutcome)> {
    orphans
        .iter()
        .map(|candidate| (*candidate, delete_file(&candidate.path)))
        .collect()
}
