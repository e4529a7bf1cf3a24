//! # orphanmd - find files no document mentions
//!
//! orphanmd indexes a corpus of markdown documents and reports (or deletes)
//! every file of a candidate directory whose relative path never appears in
//! any document. A path counts as referenced only when its exact token
//! sequence occurs contiguously, so `reports/report.pdf` is not satisfied
//! by a bare mention of `report.pdf`.
//!
//! ## Architecture
//!
//! - [`utils`] - Tokenizer, path helpers, varint encoding, configuration
//! - [`index`] - Document store, positional inverted index, on-disk format
//! - [`query`] - Exact phrase matching over any posting source
//! - [`detect`] - Candidate enumeration, classification and deletion
//! - [`output`] - Terminal report
//!
//! ## Quick Start
//!
//! ```
//! use orphanmd::index::{DocumentStore, InvertedIndex};
//! use orphanmd::query::PhraseQuery;
//! use orphanmd::detect::{classify, Classification};
//!
//! let mut store = DocumentStore::new();
//! store.add_document("README.md", "see assets/img/cat.png for details");
//! let index = InvertedIndex::build(&store);
//!
//! let query = PhraseQuery::new(&index);
//! assert_eq!(classify("assets/img/cat.png", &query).unwrap(), Classification::Referenced);
//! assert_eq!(classify("old/notes.md", &query).unwrap(), Classification::Orphaned);
//! ```

pub mod detect;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;

pub use error::{OrphanError, Result};
