use crate::index::source::PostingSource;
use crate::index::types::{DocId, Posting, Position};
use std::borrow::Cow;

/// Exact phrase matching over a positional index.
///
/// A phrase matches a document when its terms occur at consecutive
/// positions. Queries only read the index, so one `PhraseQuery` can be
/// shared across worker threads when the source is `Sync`.
pub struct PhraseQuery<'a, S: PostingSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: PostingSource + ?Sized> PhraseQuery<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// True when some document contains `phrase` contiguously
    pub fn contains_phrase<T: AsRef<str>>(&self, phrase: &[T]) -> bool {
        !self.scan(phrase, true).is_empty()
    }

    /// Every document containing `phrase`, ascending
    pub fn matching_documents<T: AsRef<str>>(&self, phrase: &[T]) -> Vec<DocId> {
        self.scan(phrase, false)
    }

    fn scan<T: AsRef<str>>(&self, phrase: &[T], first_only: bool) -> Vec<DocId> {
        if phrase.is_empty() {
            return Vec::new();
        }

        let mut lists: Vec<Cow<'_, [Posting]>> = Vec::with_capacity(phrase.len());
        for term in phrase {
            let postings = self.source.postings_for(term.as_ref());
            if postings.is_empty() {
                return Vec::new();
            }
            debug_assert!(postings.is_sorted());
            lists.push(postings);
        }

        let Some((first, rest)) = lists.split_first() else {
            return Vec::new();
        };

        // Start positions visit (doc, pos) in ascending order, so each target
        // (doc, pos + i) ascends too and the cursors only ever move forward.
        let mut cursors = vec![0usize; rest.len()];
        let mut matches = Vec::new();
        let mut skip_doc: Option<DocId> = None;

        for start in first.iter() {
            if skip_doc == Some(start.doc_id) {
                continue;
            }

            let contiguous = rest.iter().zip(cursors.iter_mut()).enumerate().all(|(i, (list, cursor))| {
                let Some(position) = offset_position(start.position, i + 1) else {
                    return false;
                };
                seek(list, cursor, Posting::new(start.doc_id, position))
            });

            if contiguous {
                matches.push(start.doc_id);
                if first_only {
                    break;
                }
                skip_doc = Some(start.doc_id);
            }
        }

        matches
    }
}

#[inline]
fn offset_position(start: Position, offset: usize) -> Option<Position> {
    Position::try_from(offset).ok().and_then(|o| start.checked_add(o))
}

/// Advance `cursor` to the first posting >= `target`; true on an exact hit
#[inline]
fn seek(list: &[Posting], cursor: &mut usize, target: Posting) -> bool {
    let remaining = &list[*cursor..];
    *cursor += remaining.partition_point(|p| *p < target);
    list.get(*cursor) == Some(&target)
}
