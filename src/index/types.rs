use crate::utils::Term;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Unique identifier for a document in the index, dense from 0
pub type DocId = u32;

/// 0-based index of a term within its document's term sequence
pub type Position = u32;

/// On-disk format version written to meta.json
pub const INDEX_VERSION: u32 = 1;

/// Posting entry - one occurrence of a term
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Posting {
    pub doc_id: DocId,
    pub position: Position,
}

impl Posting {
    pub fn new(doc_id: DocId, position: Position) -> Self {
        Self { doc_id, position }
    }
}

/// Document entry in the document store. Immutable once added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub doc_id: DocId,
    pub source_path: PathBuf,
    pub terms: Vec<Term>,
}

/// Lightweight document record kept by a persisted index (terms live in the postings)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub doc_id: DocId,
    pub source_path: PathBuf,
    pub term_count: u32,
}

/// What a persisted index was built from.
///
/// An index is only reused by a run with an identical scope, since the
/// candidate root decides which documents were left out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexScope {
    pub corpus_root: PathBuf,
    pub candidate_root: PathBuf,
    pub document_patterns: Vec<String>,
}

impl IndexScope {
    /// Name of the first setting that differs from `requested`, if any
    pub fn mismatch(&self, requested: &IndexScope) -> Option<&'static str> {
        if self.corpus_root != requested.corpus_root {
            Some("corpus root")
        } else if self.candidate_root != requested.candidate_root {
            Some("candidate root")
        } else if self.document_patterns != requested.document_patterns {
            Some("document patterns")
        } else {
            None
        }
    }
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexMeta {
    pub version: u32,
    #[serde(flatten)]
    pub scope: IndexScope,
    pub doc_count: u32,
    pub term_count: u32,
    pub posting_count: u64,
    pub created_at: u64,
}

impl Default for IndexMeta {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            scope: IndexScope::default(),
            doc_count: 0,
            term_count: 0,
            posting_count: 0,
            created_at: 0,
        }
    }
}

/// Where the inverted index lives for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLocation {
    /// Built in memory and dropped at exit
    Ephemeral,
    /// Loaded from, or persisted to, this directory
    Directory(PathBuf),
}

impl IndexLocation {
    pub fn from_option(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) => IndexLocation::Directory(dir),
            None => IndexLocation::Ephemeral,
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        match self {
            IndexLocation::Ephemeral => None,
            IndexLocation::Directory(dir) => Some(dir),
        }
    }
}

/// Counts reported after an index is built or loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub doc_count: u32,
    pub term_count: u32,
    pub posting_count: u64,
}

/// Name of the metadata file; its presence marks a complete index
pub const META_FILE: &str = "meta.json";
pub const DOCS_FILE: &str = "docs.bin";
pub const TERMS_DICT_FILE: &str = "terms.dict";
pub const TERMS_POSTINGS_FILE: &str = "terms.postings";
