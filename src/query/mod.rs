pub mod phrase;

pub use phrase::PhraseQuery;
