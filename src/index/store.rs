use crate::index::types::{DocId, Document};
use crate::utils::tokenize;
use std::path::PathBuf;

/// Append-only set of tokenized documents.
///
/// Ids are handed out sequentially from 0, so `documents()[id]` is the
/// document with that id.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize `content` and store it under the next id
    pub fn add_document(&mut self, source_path: impl Into<PathBuf>, content: &str) -> DocId {
        let doc_id = self.documents.len() as DocId;
        self.documents.push(Document {
            doc_id,
            source_path: source_path.into(),
            terms: tokenize(content).collect(),
        });
        doc_id
    }

    pub fn get(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(doc_id as usize)
    }

    /// Documents in id order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_from_zero() {
        let mut store = DocumentStore::new();
        assert!(store.is_empty());

        let a = store.add_document("a.md", "first doc");
        let b = store.add_document("b.md", "");
        let c = store.add_document("c.md", "third");

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(store.len(), 3);
        for (i, doc) in store.documents().iter().enumerate() {
            assert_eq!(doc.doc_id as usize, i);
        }
    }

    #[test]
    fn test_content_is_tokenized() {
        let mut store = DocumentStore::new();
        let id = store.add_document("readme.md", "See Assets/IMG/cat.png");

        let doc = store.get(id).unwrap();
        assert_eq!(doc.source_path, PathBuf::from("readme.md"));
        assert_eq!(doc.terms, vec!["see", "assets", "img", "cat", "png"]);
    }

    #[test]
    fn test_unknown_id() {
        let store = DocumentStore::new();
        assert!(store.get(0).is_none());
    }
}
