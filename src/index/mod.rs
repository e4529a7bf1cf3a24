pub mod build;
pub mod inverted;
pub mod reader;
pub mod source;
pub mod store;
pub mod types;
pub mod writer;

pub use build::{CorpusOptions, IndexSession, LoadedIndex, open_or_build};
pub use inverted::InvertedIndex;
pub use reader::IndexReader;
pub use source::PostingSource;
pub use store::DocumentStore;
pub use types::*;
pub use writer::IndexWriter;
