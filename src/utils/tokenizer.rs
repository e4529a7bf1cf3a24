//! Term extraction shared by indexing and querying.
//!
//! A term is a maximal run of grapheme clusters that start with a Unicode
//! letter or digit, lowercased. Combining marks stay attached to their base
//! character, so a decomposed `café` is one term. Everything else
//! (whitespace, punctuation, path separators, underscores) separates terms
//! and is dropped. No length filter and no stop-word list: a single letter
//! path segment must survive as a term or phrase matching changes.
//!
//! Text is not normalized; composed and decomposed spellings of the same
//! word are different terms.

use unicode_segmentation::UnicodeSegmentation;

/// A normalized token
pub type Term = String;

#[inline]
fn is_term_grapheme(grapheme: &str) -> bool {
    grapheme.chars().next().is_some_and(char::is_alphanumeric)
}

/// Lazy iterator over the terms of a piece of text.
///
/// Cloning the iterator restarts it from the clone point, so a `Tokens`
/// value can be walked any number of times.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Term;

    fn next(&mut self) -> Option<Term> {
        let rest = self.rest;
        let mut graphemes = rest.grapheme_indices(true);

        let Some((start, _)) = graphemes.find(|(_, g)| is_term_grapheme(g)) else {
            self.rest = "";
            return None;
        };
        let end = graphemes
            .find(|(_, g)| !is_term_grapheme(g))
            .map_or(rest.len(), |(i, _)| i);

        self.rest = &rest[end..];
        Some(rest[start..end].to_lowercase())
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

/// Split text into lowercased terms
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

/// Collect the terms of `text` into a vector
pub fn tokenize_to_vec(text: &str) -> Vec<Term> {
    tokenize(text).collect()
}
