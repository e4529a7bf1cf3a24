use crate::index::types::{DocId, IndexStats, Posting};
use std::borrow::Cow;
use std::path::Path;

/// Read side of an inverted index, shared by the in-memory and on-disk forms.
///
/// Implementations must return postings sorted by (doc_id, position).
pub trait PostingSource {
    /// Occurrences of `term`; empty when the term was never indexed
    fn postings_for(&self, term: &str) -> Cow<'_, [Posting]>;

    /// Path of the document the id was assigned to
    fn source_path(&self, doc_id: DocId) -> Option<&Path>;

    fn stats(&self) -> IndexStats;
}

impl<T: PostingSource + ?Sized> PostingSource for &T {
    fn postings_for(&self, term: &str) -> Cow<'_, [Posting]> {
        (**self).postings_for(term)
    }

    fn source_path(&self, doc_id: DocId) -> Option<&Path> {
        (**self).source_path(doc_id)
    }

    fn stats(&self) -> IndexStats {
        (**self).stats()
    }
}
