use crate::error::{OrphanError, Result};
use crate::index::inverted::InvertedIndex;
use crate::index::reader::IndexReader;
use crate::index::source::PostingSource;
use crate::index::store::DocumentStore;
use crate::index::types::{DocId, IndexLocation, IndexScope, IndexStats, Posting};
use crate::index::writer::IndexWriter;
use crate::utils::is_within;
use crate::utils::progress;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How the corpus is discovered and ingested
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Canonical corpus root
    pub corpus_root: PathBuf,
    /// Canonical candidate root; documents under it are not indexed
    pub candidate_root: PathBuf,
    /// File name globs selecting documents
    pub document_patterns: Vec<String>,
    pub max_file_size: u64,
    /// Exclude unreadable documents with a warning instead of failing the run
    pub skip_unreadable: bool,
    /// Directories never entered (the index directory itself)
    pub excluded_dirs: Vec<PathBuf>,
    pub show_progress: bool,
}

impl CorpusOptions {
    /// The settings a persisted index must have been built with to be reused
    pub fn scope(&self) -> IndexScope {
        IndexScope {
            corpus_root: self.corpus_root.clone(),
            candidate_root: self.candidate_root.clone(),
            document_patterns: self.document_patterns.clone(),
        }
    }
}

/// Result of ingesting the corpus
pub struct CorpusIngest {
    pub store: DocumentStore,
    /// Documents visibly excluded under `skip_unreadable`
    pub skipped: Vec<OrphanError>,
}

/// Compile document globs, matched case-insensitively against file names
pub fn compile_patterns(patterns: &[String]) -> Result<GlobSet> {
    if patterns.is_empty() {
        return Err(OrphanError::Configuration(
            "at least one document pattern is required".to_string(),
        ));
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                OrphanError::Configuration(format!("invalid document pattern {:?}: {}", pattern, e))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| OrphanError::Configuration(format!("invalid document patterns: {}", e)))
}

/// Enumerate corpus documents, sorted by path so ids are reproducible.
///
/// Walk errors are fatal unless `skip_unreadable` is set, in which case they
/// are returned alongside the documents that could be listed.
pub fn discover_documents(options: &CorpusOptions) -> Result<(Vec<PathBuf>, Vec<OrphanError>)> {
    let patterns = compile_patterns(&options.document_patterns)?;

    let candidate_root = options.candidate_root.clone();
    let excluded = options.excluded_dirs.clone();
    let walker = WalkBuilder::new(&options.corpus_root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let path = entry.path();
            !is_within(path, &candidate_root) && !excluded.iter().any(|dir| is_within(path, dir))
        })
        .build();

    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let err = OrphanError::ingest(&options.corpus_root, err);
                if options.skip_unreadable {
                    debug!("{}", err);
                    skipped.push(err);
                    continue;
                }
                return Err(err);
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if patterns.is_match(Path::new(entry.file_name())) {
            documents.push(entry.into_path());
        }
    }

    documents.sort();
    Ok((documents, skipped))
}

/// Read a document as text.
///
/// Missing files, oversized files, binary content and invalid UTF-8 all
/// yield an ingest error naming the path.
pub fn read_document_text(path: &Path, max_file_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| OrphanError::ingest(path, e))?;
    if metadata.len() > max_file_size {
        return Err(OrphanError::ingest(
            path,
            format!("{} bytes exceeds the {} byte limit", metadata.len(), max_file_size),
        ));
    }

    let content = fs::read(path).map_err(|e| OrphanError::ingest(path, e))?;

    let sample = &content[..content.len().min(8192)];
    if memchr::memchr(0, sample).is_some() {
        return Err(OrphanError::ingest(path, "binary content"));
    }

    String::from_utf8(content).map_err(|e| OrphanError::ingest(path, e.utf8_error()))
}

/// Read and tokenize every document into a fresh store.
///
/// Files are read in parallel, then added one at a time in path order so
/// ids stay dense and deterministic.
pub fn ingest_documents(paths: &[PathBuf], options: &CorpusOptions) -> Result<CorpusIngest> {
    let pb = progress::bar(paths.len() as u64, "Reading documents...", options.show_progress);

    let contents: Vec<Result<String>> = paths
        .par_iter()
        .map(|path| {
            let result = read_document_text(path, options.max_file_size);
            if let Some(ref pb) = pb {
                pb.inc(1);
            }
            result
        })
        .collect();

    let mut store = DocumentStore::new();
    let mut skipped = Vec::new();

    for (path, content) in paths.iter().zip(contents) {
        match content {
            Ok(text) => {
                store.add_document(path.clone(), &text);
            }
            Err(err) if options.skip_unreadable => {
                debug!("{}", err);
                skipped.push(err);
            }
            Err(err) => {
                if let Some(pb) = pb {
                    pb.finish_and_clear();
                }
                return Err(err);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message(format!("Indexed {} documents", store.len()));
    }

    Ok(CorpusIngest { store, skipped })
}

/// Discover, ingest and index the corpus in memory
pub fn build_corpus_index(options: &CorpusOptions) -> Result<(InvertedIndex, Vec<OrphanError>)> {
    let spinner = progress::spinner("Discovering documents...", options.show_progress);
    let (paths, mut skipped) = discover_documents(options)?;
    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!("Found {} documents", paths.len()));
    }
    debug!(documents = paths.len(), root = %options.corpus_root.display(), "corpus discovered");

    let ingest = ingest_documents(&paths, options)?;
    skipped.extend(ingest.skipped);

    let index = InvertedIndex::build(&ingest.store);
    Ok((index, skipped))
}

/// Index available to queries for this run
pub enum LoadedIndex {
    Memory(InvertedIndex),
    Disk(IndexReader),
}

impl PostingSource for LoadedIndex {
    fn postings_for(&self, term: &str) -> Cow<'_, [Posting]> {
        match self {
            LoadedIndex::Memory(index) => index.postings_for(term),
            LoadedIndex::Disk(reader) => reader.postings_for(term),
        }
    }

    fn source_path(&self, doc_id: DocId) -> Option<&Path> {
        match self {
            LoadedIndex::Memory(index) => index.source_path(doc_id),
            LoadedIndex::Disk(reader) => reader.source_path(doc_id),
        }
    }

    fn stats(&self) -> IndexStats {
        match self {
            LoadedIndex::Memory(index) => index.stats(),
            LoadedIndex::Disk(reader) => reader.stats(),
        }
    }
}

/// Outcome of [`open_or_build`]
pub struct IndexSession {
    pub index: LoadedIndex,
    /// Documents excluded while building (empty when the index was loaded)
    pub skipped: Vec<OrphanError>,
    /// True when an existing persisted index was reused
    pub loaded: bool,
}

/// Load the index from `location` when one built with the same scope is
/// there, otherwise build it (and persist it when the location is a
/// directory, replacing an index of a different scope).
pub fn open_or_build(
    location: &IndexLocation,
    rebuild: bool,
    options: &CorpusOptions,
) -> Result<IndexSession> {
    let scope = options.scope();

    if let IndexLocation::Directory(dir) = location {
        if !rebuild && IndexReader::exists(dir) {
            let persisted = IndexReader::read_meta(dir)?;
            match persisted.scope.mismatch(&scope) {
                None => {
                    let spinner = progress::spinner("Loading index...", options.show_progress);
                    let reader = IndexReader::open(dir)?;
                    if let Some(spinner) = spinner {
                        spinner.finish_and_clear();
                    }

                    log_stats("loaded", &reader.stats());
                    return Ok(IndexSession {
                        index: LoadedIndex::Disk(reader),
                        skipped: Vec::new(),
                        loaded: true,
                    });
                }
                Some(setting) => warn!(
                    dir = %dir.display(),
                    "persisted index was built with a different {}, rebuilding",
                    setting
                ),
            }
        }
    }

    let (index, skipped) = build_corpus_index(options)?;

    if let IndexLocation::Directory(dir) = location {
        let meta = IndexWriter::new(dir, &index).write(&scope)?;
        debug!(dir = %dir.display(), terms = meta.term_count, "index persisted");
    }

    log_stats("built", &index.stats());
    Ok(IndexSession {
        index: LoadedIndex::Memory(index),
        skipped,
        loaded: false,
    })
}

fn log_stats(action: &str, stats: &IndexStats) {
    info!(
        documents = stats.doc_count,
        terms = stats.term_count,
        postings = stats.posting_count,
        "index {}",
        action
    );
}
