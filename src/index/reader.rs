use crate::error::{OrphanError, Result};
use crate::index::source::PostingSource;
use crate::index::types::*;
use crate::utils::{VarintCursor, read_u16_le, read_u32_le, read_u64_le};
use anyhow::Context;
use memmap2::Mmap;
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Term dictionary entry
struct TermDictEntry {
    term: String,
    offset: u64,
    length: u32,
    doc_freq: u32,
}

/// Term dictionary, sorted by term bytes
struct TermDict {
    entries: Vec<TermDictEntry>,
}

impl TermDict {
    fn lookup(&self, term: &str) -> Option<&TermDictEntry> {
        self.entries
            .binary_search_by(|e| e.term.as_str().cmp(term))
            .ok()
            .map(|i| &self.entries[i])
    }
}

/// Memory-mapped reader over a persisted index directory.
///
/// The postings file stays mapped for the reader's lifetime and is
/// unmapped on drop. Every posting list is decoded and checked once in
/// [`IndexReader::open`], so lookups afterwards cannot fail.
pub struct IndexReader {
    index_path: PathBuf,
    pub meta: IndexMeta,
    documents: Vec<DocumentInfo>,
    dict: TermDict,
    postings: Option<Mmap>,
}

impl IndexReader {
    /// True when `index_path` holds a complete index (meta.json is written last)
    pub fn exists(index_path: &Path) -> bool {
        index_path.join(META_FILE).is_file()
    }

    /// Open an existing index
    pub fn open(index_path: &Path) -> Result<Self> {
        Self::open_inner(index_path).map_err(|e| OrphanError::from_persistence_chain(index_path, e))
    }

    /// Read and version-check meta.json without touching the other files
    pub fn read_meta(index_path: &Path) -> Result<IndexMeta> {
        read_meta_inner(index_path).map_err(|e| OrphanError::from_persistence_chain(index_path, e))
    }

    fn open_inner(index_path: &Path) -> anyhow::Result<Self> {
        let meta = read_meta_inner(index_path)?;

        // Documents and dictionary are independent files
        let (documents, dict) = rayon::join(
            || read_documents(index_path),
            || read_term_dict(index_path),
        );
        let documents = documents.context("Failed to read docs.bin")?;
        let dict = dict.context("Failed to read terms.dict")?;

        if documents.len() != meta.doc_count as usize {
            anyhow::bail!(
                "docs.bin holds {} documents but meta.json records {}",
                documents.len(),
                meta.doc_count
            );
        }

        let postings_path = index_path.join(TERMS_POSTINGS_FILE);
        let postings_file = File::open(&postings_path).context("Failed to open terms.postings")?;
        let postings_len = postings_file.metadata()?.len();
        let postings = if postings_len == 0 {
            None
        } else {
            // SAFETY: the index directory is not modified while a run holds it open
            Some(unsafe { Mmap::map(&postings_file) }.context("Failed to map terms.postings")?)
        };

        let reader = Self {
            index_path: index_path.to_path_buf(),
            meta,
            documents,
            dict,
            postings,
        };
        reader.verify()?;
        Ok(reader)
    }

    /// Decode every posting list once and check its invariants
    fn verify(&self) -> anyhow::Result<()> {
        if !self.dict.entries.windows(2).all(|w| w[0].term < w[1].term) {
            anyhow::bail!("terms.dict is not sorted");
        }

        let doc_count = self.documents.len() as DocId;
        let posting_count: u64 = self
            .dict
            .entries
            .par_iter()
            .map(|entry| {
                let postings = self
                    .decode(entry)
                    .with_context(|| format!("corrupt postings for term {:?}", entry.term))?;
                if postings.is_empty()
                    || !postings.is_sorted()
                    || postings.iter().any(|p| p.doc_id >= doc_count)
                {
                    anyhow::bail!("invalid postings for term {:?}", entry.term);
                }
                let docs = 1 + postings.windows(2).filter(|w| w[0].doc_id != w[1].doc_id).count();
                if docs != entry.doc_freq as usize {
                    anyhow::bail!("document frequency mismatch for term {:?}", entry.term);
                }
                Ok(postings.len() as u64)
            })
            .sum::<anyhow::Result<u64>>()?;

        if posting_count != self.meta.posting_count {
            anyhow::bail!(
                "terms.postings holds {} postings but meta.json records {}",
                posting_count,
                self.meta.posting_count
            );
        }
        Ok(())
    }

    fn decode(&self, entry: &TermDictEntry) -> anyhow::Result<Vec<Posting>> {
        let bytes: &[u8] = self.postings.as_deref().unwrap_or(&[]);
        let start = usize::try_from(entry.offset)?;
        let end = start
            .checked_add(entry.length as usize)
            .filter(|&end| end <= bytes.len())
            .context("postings range out of bounds")?;

        decode_postings(&bytes[start..end]).context("truncated posting list")
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn documents(&self) -> &[DocumentInfo] {
        &self.documents
    }
}

impl PostingSource for IndexReader {
    fn postings_for(&self, term: &str) -> Cow<'_, [Posting]> {
        match self.dict.lookup(term) {
            Some(entry) => {
                let decoded = self.decode(entry);
                debug_assert!(
                    decoded.is_ok(),
                    "postings for {:?} passed verify() but failed to decode",
                    entry.term
                );
                Cow::Owned(decoded.unwrap_or_default())
            }
            None => Cow::Borrowed(&[]),
        }
    }

    fn source_path(&self, doc_id: DocId) -> Option<&Path> {
        self.documents
            .get(doc_id as usize)
            .map(|d| d.source_path.as_path())
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            doc_count: self.meta.doc_count,
            term_count: self.dict.entries.len() as u32,
            posting_count: self.meta.posting_count,
        }
    }
}

fn read_meta_inner(index_path: &Path) -> anyhow::Result<IndexMeta> {
    let meta_path = index_path.join(META_FILE);
    let meta_file = File::open(&meta_path).context("Failed to open meta.json")?;
    let meta: IndexMeta =
        serde_json::from_reader(BufReader::new(meta_file)).context("Failed to parse meta.json")?;

    if meta.version != INDEX_VERSION {
        anyhow::bail!(
            "unsupported index version {} (expected {})",
            meta.version,
            INDEX_VERSION
        );
    }
    Ok(meta)
}

/// Decode `[doc delta][count][position deltas...]` groups
fn decode_postings(buf: &[u8]) -> Option<Vec<Posting>> {
    let mut cursor = VarintCursor::new(buf);
    let mut postings = Vec::new();
    let mut doc_id: DocId = 0;

    while !cursor.is_empty() {
        doc_id = doc_id.checked_add(cursor.next_u32()?)?;
        let count = cursor.next_u32()?;

        let mut position: Position = 0;
        for _ in 0..count {
            position = position.checked_add(cursor.next_u32()?)?;
            postings.push(Posting::new(doc_id, position));
        }
    }

    Some(postings)
}

/// Read documents from docs.bin
fn read_documents(index_path: &Path) -> anyhow::Result<Vec<DocumentInfo>> {
    let docs_path = index_path.join(DOCS_FILE);
    let mut file = BufReader::new(File::open(&docs_path)?);

    let count = read_u32_le(&mut file)? as usize;
    let mut documents = Vec::with_capacity(count.min(1 << 20));

    for expected_id in 0..count {
        let doc_id = read_u32_le(&mut file)?;
        if doc_id as usize != expected_id {
            anyhow::bail!("document ids are not dense (found {} at slot {})", doc_id, expected_id);
        }
        let term_count = read_u32_le(&mut file)?;
        let len = read_u32_le(&mut file)? as usize;

        let mut path_bytes = vec![0u8; len];
        file.read_exact(&mut path_bytes)?;
        let path_str = String::from_utf8_lossy(&path_bytes);

        documents.push(DocumentInfo {
            doc_id,
            source_path: PathBuf::from(path_str.as_ref()),
            term_count,
        });
    }

    Ok(documents)
}

/// Read term dictionary
fn read_term_dict(index_path: &Path) -> anyhow::Result<TermDict> {
    let dict_path = index_path.join(TERMS_DICT_FILE);
    let mut file = BufReader::new(File::open(&dict_path)?);

    let count = read_u32_le(&mut file)? as usize;
    let mut entries = Vec::with_capacity(count.min(1 << 20));

    for _ in 0..count {
        let term_len = read_u16_le(&mut file)? as usize;
        let mut term_bytes = vec![0u8; term_len];
        file.read_exact(&mut term_bytes)?;
        let term = String::from_utf8(term_bytes).context("term is not valid UTF-8")?;

        let offset = read_u64_le(&mut file)?;
        let length = read_u32_le(&mut file)?;
        let doc_freq = read_u32_le(&mut file)?;

        entries.push(TermDictEntry {
            term,
            offset,
            length,
            doc_freq,
        });
    }

    // Written sorted from sorted_terms(); order is checked in verify()
    Ok(TermDict { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::inverted::InvertedIndex;
    use crate::index::store::DocumentStore;
    use crate::index::writer::IndexWriter;
    use std::fs;

    fn persisted(dir: &Path) -> InvertedIndex {
        let mut store = DocumentStore::new();
        store.add_document("/docs/a.md", "See assets/img/cat.png for details");
        store.add_document("/docs/b.md", "cat cat cat");
        store.add_document("/docs/empty.md", "");
        let index = InvertedIndex::build(&store);
        IndexWriter::new(dir, &index)
            .write(&IndexScope {
                corpus_root: PathBuf::from("/docs"),
                candidate_root: PathBuf::from("/docs/assets"),
                document_patterns: vec!["*.md".to_string()],
            })
            .unwrap();
        index
    }

    #[test]
    fn test_reader_matches_memory_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = persisted(dir.path());

        assert!(IndexReader::exists(dir.path()));
        let reader = IndexReader::open(dir.path()).unwrap();

        assert_eq!(reader.stats(), index.stats());
        for (term, postings) in index.sorted_terms() {
            assert_eq!(reader.postings_for(term).as_ref(), postings);
        }
        assert!(reader.postings_for("dog").is_empty());
        assert_eq!(reader.source_path(2), Some(Path::new("/docs/empty.md")));
        assert_eq!(reader.documents()[1].term_count, 3);
        assert_eq!(reader.meta.scope.corpus_root, PathBuf::from("/docs"));
        assert_eq!(
            IndexReader::read_meta(dir.path()).unwrap().scope.candidate_root,
            PathBuf::from("/docs/assets")
        );
    }

    #[test]
    fn test_empty_index_opens() {
        let dir = tempfile::tempdir().unwrap();
        let index = InvertedIndex::build(&DocumentStore::new());
        IndexWriter::new(dir.path(), &index)
            .write(&IndexScope::default())
            .unwrap();

        let reader = IndexReader::open(dir.path()).unwrap();
        assert_eq!(reader.stats(), IndexStats::default());
        assert!(reader.postings_for("anything").is_empty());
    }

    #[test]
    fn test_missing_index_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!IndexReader::exists(dir.path()));
        let err = IndexReader::open(dir.path()).err().unwrap();
        assert!(matches!(err, OrphanError::Persistence { .. }));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        persisted(dir.path());

        let meta_path = dir.path().join(META_FILE);
        let mut meta: IndexMeta =
            serde_json::from_str(&fs::read_to_string(&meta_path).unwrap()).unwrap();
        meta.version = 99;
        fs::write(&meta_path, serde_json::to_string(&meta).unwrap()).unwrap();

        let err = IndexReader::open(dir.path()).err().unwrap();
        assert!(err.to_string().contains("unsupported index version 99"));
    }

    #[test]
    fn test_truncated_postings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        persisted(dir.path());

        let postings_path = dir.path().join(TERMS_POSTINGS_FILE);
        let bytes = fs::read(&postings_path).unwrap();
        fs::write(&postings_path, &bytes[..bytes.len() / 2]).unwrap();

        let err = IndexReader::open(dir.path()).err().unwrap();
        assert!(matches!(err, OrphanError::Persistence { .. }));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "passed verify() but failed to decode")]
    fn test_undecodable_postings_trip_debug_assert() {
        // Bypasses open(), so the out-of-range entry is never verified
        let reader = IndexReader {
            index_path: PathBuf::from("/idx"),
            meta: IndexMeta::default(),
            documents: Vec::new(),
            dict: TermDict {
                entries: vec![TermDictEntry {
                    term: "cat".to_string(),
                    offset: 0,
                    length: 4,
                    doc_freq: 1,
                }],
            },
            postings: None,
        };
        let _ = reader.postings_for("cat");
    }

    #[test]
    fn test_decode_postings() {
        let buf = [0, 2, 1, 3, 3, 1, 0];
        assert_eq!(
            decode_postings(&buf).unwrap(),
            vec![Posting::new(0, 1), Posting::new(0, 4), Posting::new(3, 0)]
        );
        assert!(decode_postings(&[0, 2, 1]).is_none());
    }
}
