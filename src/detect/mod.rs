//! Orphan detection: enumerate candidates, classify them against the
//! corpus index and delete (or just report) the unreferenced ones.

pub mod candidates;
pub mod classify;
pub mod delete;

pub use candidates::{Candidate, discover_candidates};
pub use classify::{Classification, DetectionReport, Orphan, OrphanDetector, candidate_phrase, classify};

use crate::error::{OrphanError, Result};
use crate::index::{CorpusOptions, IndexLocation, IndexStats, PostingSource, open_or_build};
use crate::utils::resolve_root;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Everything one run needs, resolved from CLI flags and config
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub candidate_root: PathBuf,
    pub corpus_root: PathBuf,
    pub index: IndexLocation,
    pub rebuild: bool,
    pub dry_run: bool,
    pub recursive: bool,
    pub document_patterns: Vec<String>,
    pub max_file_size: u64,
    pub skip_unreadable: bool,
    pub jobs: usize,
    pub show_progress: bool,
}

/// Outcome of a full run
#[derive(Debug)]
pub struct RunReport {
    pub detection: DetectionReport,
    /// Documents excluded from the index under `skip_unreadable`
    pub skipped_documents: Vec<OrphanError>,
    pub index_stats: IndexStats,
    /// True when a persisted index was reused instead of built
    pub index_loaded: bool,
}

/// Build or load the index, then classify every candidate
pub fn run(options: &RunOptions) -> Result<RunReport> {
    let candidate_root = resolve_root(&options.candidate_root, "candidate root")?;
    let corpus_root = resolve_root(&options.corpus_root, "corpus root")?;

    // The index directory must exist before it can be compared against
    // walked paths, and is never treated as corpus or candidate content.
    let mut excluded_dirs = Vec::new();
    if let IndexLocation::Directory(dir) = &options.index {
        fs::create_dir_all(dir).map_err(|e| OrphanError::persistence(dir, e))?;
        let dir = dir.canonicalize().map_err(|e| OrphanError::persistence(dir, e))?;
        excluded_dirs.push(dir);
    }

    let corpus = CorpusOptions {
        corpus_root,
        candidate_root: candidate_root.clone(),
        document_patterns: options.document_patterns.clone(),
        max_file_size: options.max_file_size,
        skip_unreadable: options.skip_unreadable,
        excluded_dirs: excluded_dirs.clone(),
        show_progress: options.show_progress,
    };

    let session = open_or_build(&options.index, options.rebuild, &corpus)?;
    let index_stats = session.index.stats();

    let candidates = discover_candidates(&candidate_root, options.recursive, &excluded_dirs)?;
    info!(candidates = candidates.len(), root = %candidate_root.display(), "candidates discovered");

    let detector = OrphanDetector::new(&session.index, options.jobs);
    let detection = detector.run(&candidates, options.dry_run)?;

    Ok(RunReport {
        detection,
        skipped_documents: session.skipped,
        index_stats,
        index_loaded: session.loaded,
    })
}
