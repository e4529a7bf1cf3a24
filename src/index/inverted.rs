use crate::index::source::PostingSource;
use crate::index::store::DocumentStore;
use crate::index::types::{DocId, IndexStats, Posting, Position};
use crate::utils::Term;
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// In-memory positional inverted index: term -> postings sorted by (doc, position)
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: FxHashMap<Term, Vec<Posting>>,
    source_paths: Vec<PathBuf>,
    posting_count: u64,
}

impl InvertedIndex {
    /// Build from a finished document store.
    ///
    /// Documents are visited in id order and terms left to right, so every
    /// posting list comes out sorted without a sort pass.
    pub fn build(store: &DocumentStore) -> Self {
        let mut postings: FxHashMap<Term, Vec<Posting>> = FxHashMap::default();
        let mut source_paths = Vec::with_capacity(store.len());
        let mut posting_count = 0u64;

        for doc in store.documents() {
            for (position, term) in doc.terms.iter().enumerate() {
                postings
                    .entry(term.clone())
                    .or_default()
                    .push(Posting::new(doc.doc_id, position as Position));
                posting_count += 1;
            }
            source_paths.push(doc.source_path.clone());
        }

        debug_assert!(postings.values().all(|list| list.is_sorted()));

        Self {
            postings,
            source_paths,
            posting_count,
        }
    }

    /// Terms in byte order, paired with their postings
    pub fn sorted_terms(&self) -> Vec<(&str, &[Posting])> {
        let mut terms: Vec<_> = self
            .postings
            .iter()
            .map(|(term, list)| (term.as_str(), list.as_slice()))
            .collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));
        terms
    }

    pub fn source_paths(&self) -> &[PathBuf] {
        &self.source_paths
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }
}

impl PostingSource for InvertedIndex {
    fn postings_for(&self, term: &str) -> Cow<'_, [Posting]> {
        match self.postings.get(term) {
            Some(list) => Cow::Borrowed(list.as_slice()),
            None => Cow::Borrowed(&[]),
        }
    }

    fn source_path(&self, doc_id: DocId) -> Option<&Path> {
        self.source_paths.get(doc_id as usize).map(PathBuf::as_path)
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.source_paths.len() as u32,
            term_count: self.postings.len() as u32,
            posting_count: self.posting_count,
        }
    }
}
