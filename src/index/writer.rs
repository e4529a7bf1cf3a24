use crate::error::{OrphanError, Result};
use crate::index::inverted::InvertedIndex;
use crate::index::source::PostingSource;
use crate::index::types::*;
use crate::utils::{delta_encode, encode_varint, write_u16_le, write_u32_le, write_u64_le};
use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Persists a built inverted index into an index directory
pub struct IndexWriter<'a> {
    index_path: PathBuf,
    index: &'a InvertedIndex,
}

impl<'a> IndexWriter<'a> {
    pub fn new(index_path: &Path, index: &'a InvertedIndex) -> Self {
        Self {
            index_path: index_path.to_path_buf(),
            index,
        }
    }

    /// Write the index to disk.
    ///
    /// meta.json is removed first and written last, so an interrupted write
    /// never looks like a complete index.
    pub fn write(&self, scope: &IndexScope) -> Result<IndexMeta> {
        self.write_all(scope)
            .map_err(|e| OrphanError::from_persistence_chain(&self.index_path, e))
    }

    fn write_all(&self, scope: &IndexScope) -> anyhow::Result<IndexMeta> {
        if self.index_path.exists() && !self.index_path.is_dir() {
            anyhow::bail!("index location is not a directory");
        }
        fs::create_dir_all(&self.index_path).context("Failed to create index directory")?;

        let meta_path = self.index_path.join(META_FILE);
        if meta_path.exists() {
            fs::remove_file(&meta_path).context("Failed to remove stale meta.json")?;
        }

        self.write_documents().context("Failed to write docs.bin")?;
        let term_count = self.write_terms().context("Failed to write term index")?;

        let stats = self.index.stats();
        let meta = IndexMeta {
            version: INDEX_VERSION,
            scope: scope.clone(),
            doc_count: stats.doc_count,
            term_count,
            posting_count: stats.posting_count,
            created_at: unix_now(),
        };
        self.write_meta(&meta).context("Failed to write meta.json")?;

        Ok(meta)
    }

    /// Write document table: count, then [id, term count, path length, path bytes]...
    fn write_documents(&self) -> anyhow::Result<()> {
        let docs_path = self.index_path.join(DOCS_FILE);
        let mut file = BufWriter::new(File::create(&docs_path)?);

        let paths = self.index.source_paths();
        write_u32_le(&mut file, paths.len() as u32)?;

        let mut term_counts = vec![0u32; paths.len()];
        for (_, postings) in self.index.sorted_terms() {
            for posting in postings {
                term_counts[posting.doc_id as usize] += 1;
            }
        }

        for (doc_id, path) in paths.iter().enumerate() {
            let path_str = path.to_string_lossy();
            let bytes = path_str.as_bytes();
            write_u32_le(&mut file, doc_id as DocId)?;
            write_u32_le(&mut file, term_counts[doc_id])?;
            write_u32_le(&mut file, bytes.len() as u32)?;
            file.write_all(bytes)?;
        }

        file.flush()?;
        Ok(())
    }

    /// Write term dictionary + positional postings, returns the term count
    fn write_terms(&self) -> anyhow::Result<u32> {
        let dict_path = self.index_path.join(TERMS_DICT_FILE);
        let postings_path = self.index_path.join(TERMS_POSTINGS_FILE);

        let mut dict_file = BufWriter::new(File::create(&dict_path)?);
        let mut postings_file = BufWriter::new(File::create(&postings_path)?);

        let terms = self.index.sorted_terms();
        write_u32_le(&mut dict_file, terms.len() as u32)?;

        let mut postings_offset: u64 = 0;
        let mut encoded = Vec::new();

        for (term, postings) in &terms {
            let term_bytes = term.as_bytes();
            if term_bytes.len() > u16::MAX as usize {
                anyhow::bail!("term of {} bytes is too long to persist", term_bytes.len());
            }

            encoded.clear();
            let doc_freq = encode_postings(postings, &mut encoded);

            // Dictionary entry: term (length-prefixed), offset, length, doc_freq
            write_u16_le(&mut dict_file, term_bytes.len() as u16)?;
            dict_file.write_all(term_bytes)?;
            write_u64_le(&mut dict_file, postings_offset)?;
            write_u32_le(&mut dict_file, encoded.len() as u32)?;
            write_u32_le(&mut dict_file, doc_freq)?;

            postings_file.write_all(&encoded)?;
            postings_offset += encoded.len() as u64;
        }

        dict_file.flush()?;
        postings_file.flush()?;
        Ok(terms.len() as u32)
    }

    fn write_meta(&self, meta: &IndexMeta) -> anyhow::Result<()> {
        let meta_path = self.index_path.join(META_FILE);
        let mut file = BufWriter::new(File::create(&meta_path)?);
        serde_json::to_writer_pretty(&mut file, meta)?;
        file.flush()?;
        Ok(())
    }
}

/// Encode one posting list as groups of
/// `[doc delta][occurrence count][position deltas...]`.
/// Returns the number of distinct documents.
pub(crate) fn encode_postings(postings: &[Posting], buf: &mut Vec<u8>) -> u32 {
    let mut prev_doc: DocId = 0;
    let mut doc_freq = 0u32;
    let mut positions = Vec::new();
    let mut i = 0;

    while i < postings.len() {
        let doc_id = postings[i].doc_id;
        let end = i + postings[i..].partition_point(|p| p.doc_id == doc_id);

        positions.clear();
        positions.extend(postings[i..end].iter().map(|p| p.position));

        encode_varint(doc_id - prev_doc, buf);
        encode_varint(positions.len() as u32, buf);
        delta_encode(&positions, buf);

        prev_doc = doc_id;
        doc_freq += 1;
        i = end;
    }

    doc_freq
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
