use crate::detect::candidates::Candidate;
use crate::detect::delete::{DeletionOutcome, delete_orphans};
use crate::error::{OrphanError, Result};
use crate::index::source::PostingSource;
use crate::query::PhraseQuery;
use crate::utils::{Term, normalize_separators, tokenize_to_vec};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Whether a candidate is mentioned anywhere in the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Referenced,
    Orphaned,
}

/// Terms a candidate must appear as, derived from its relative path.
///
/// A path with no letters or digits cannot be looked up and fails the run
/// rather than being reported as an orphan.
pub fn candidate_phrase(relative: &str) -> Result<Vec<Term>> {
    let phrase = tokenize_to_vec(&normalize_separators(relative));
    if phrase.is_empty() {
        return Err(OrphanError::Configuration(format!(
            "candidate {:?} has no searchable terms in its path",
            relative
        )));
    }
    Ok(phrase)
}

/// Classify a single candidate path
pub fn classify<S: PostingSource + ?Sized>(
    relative: &str,
    query: &PhraseQuery<'_, S>,
) -> Result<Classification> {
    let phrase = candidate_phrase(relative)?;
    Ok(classify_phrase(&phrase, query))
}

fn classify_phrase<S: PostingSource + ?Sized>(
    phrase: &[Term],
    query: &PhraseQuery<'_, S>,
) -> Classification {
    if query.contains_phrase(phrase) {
        Classification::Referenced
    } else {
        Classification::Orphaned
    }
}

/// An unreferenced candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    pub path: PathBuf,
    pub relative: String,
    /// Removed from disk during this run
    pub deleted: bool,
}

/// Totals for one detection pass
#[derive(Debug, Default)]
pub struct DetectionReport {
    /// Number of candidates examined
    pub examined: usize,
    /// Orphans in candidate order
    pub orphans: Vec<Orphan>,
    pub deletion_failures: Vec<OrphanError>,
    pub dry_run: bool,
}

impl DetectionReport {
    pub fn orphan_count(&self) -> usize {
        self.orphans.len()
    }

    /// False when any orphan could not be deleted; the run then exits non-zero
    pub fn succeeded(&self) -> bool {
        self.deletion_failures.is_empty()
    }
}

/// Classifies candidates against a built index and disposes of the orphans
pub struct OrphanDetector<'a, S: PostingSource + Sync + ?Sized> {
    query: PhraseQuery<'a, S>,
    jobs: usize,
}

impl<'a, S: PostingSource + Sync + ?Sized> OrphanDetector<'a, S> {
    pub fn new(source: &'a S, jobs: usize) -> Self {
        Self {
            query: PhraseQuery::new(source),
            jobs: jobs.max(1),
        }
    }

    /// Classify every candidate on a worker pool
    pub fn classify_all(&self, candidates: &[Candidate]) -> Result<Vec<Classification>> {
        // Every phrase is derived up front so a bad path fails the run before
        // anything is classified or deleted.
        let phrases = candidates
            .iter()
            .map(|c| candidate_phrase(&c.relative))
            .collect::<Result<Vec<_>>>()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| OrphanError::Configuration(format!("cannot start worker pool: {}", e)))?;

        let query = &self.query;
        let classes = pool.install(|| {
            phrases
                .par_iter()
                .map(|phrase| classify_phrase(phrase, query))
                .collect::<Vec<_>>()
        });

        for (candidate, class) in candidates.iter().zip(&classes) {
            trace!(candidate = %candidate.relative, ?class, "classified");
        }
        Ok(classes)
    }

    /// Classify, then delete orphans unless `dry_run`
    pub fn run(&self, candidates: &[Candidate], dry_run: bool) -> Result<DetectionReport> {
        let classes = self.classify_all(candidates)?;

        let orphaned: Vec<&Candidate> = candidates
            .iter()
            .zip(&classes)
            .filter(|(_, class)| **class == Classification::Orphaned)
            .map(|(candidate, _)| candidate)
            .collect();
        debug!(
            examined = candidates.len(),
            orphans = orphaned.len(),
            dry_run,
            "classification finished"
        );

        let mut report = DetectionReport {
            examined: candidates.len(),
            dry_run,
            ..DetectionReport::default()
        };

        if dry_run {
            report.orphans = orphaned
                .into_iter()
                .map(|c| Orphan {
                    path: c.path.clone(),
                    relative: c.relative.clone(),
                    deleted: false,
                })
                .collect();
            return Ok(report);
        }

        for (candidate, outcome) in delete_orphans(&orphaned) {
            let deleted = match outcome {
                DeletionOutcome::Deleted => true,
                DeletionOutcome::Failed(err) => {
                    report.deletion_failures.push(err);
                    false
                }
            };
            report.orphans.push(Orphan {
                path: candidate.path.clone(),
                relative: candidate.relative.clone(),
                deleted,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::inverted::InvertedIndex;
    use crate::index::store::DocumentStore;

    fn index_of(docs: &[&str]) -> InvertedIndex {
        let mut store = DocumentStore::new();
        for (i, text) in docs.iter().enumerate() {
            store.add_document(format!("doc{}.md", i), text);
        }
        InvertedIndex::build(&store)
    }

    fn candidate(relative: &str) -> Candidate {
        Candidate {
            path: PathBuf::from("/candidates").join(relative),
            relative: relative.to_string(),
        }
    }

    #[test]
    fn test_candidate_phrase() {
        assert_eq!(
            candidate_phrase(r"assets\img\Cat.PNG").unwrap(),
            vec!["assets", "img", "cat", "png"]
        );
        assert!(matches!(
            candidate_phrase("__/--.~"),
            Err(OrphanError::Configuration(_))
        ));
        assert!(candidate_phrase("").is_err());
    }

    #[test]
    fn test_scenarios() {
        let index = index_of(&[
            "see assets/img/cat.png for details",
            "the quarterly report.pdf is attached",
        ]);
        let query = PhraseQuery::new(&index);

        assert_eq!(classify("assets/img/cat.png", &query).unwrap(), Classification::Referenced);
        assert_eq!(classify("old/notes.md", &query).unwrap(), Classification::Orphaned);
        assert_eq!(classify("reports/report.pdf", &query).unwrap(), Classification::Orphaned);
        assert_eq!(classify("report.pdf", &query).unwrap(), Classification::Referenced);
    }

    #[test]
    fn test_case_insensitive_classification() {
        let index = index_of(&["see assets/img/cat.png"]);
        let query = PhraseQuery::new(&index);
        assert_eq!(
            classify("Assets/IMG/Cat.PNG", &query).unwrap(),
            classify("assets/img/cat.png", &query).unwrap()
        );
    }

    #[test]
    fn test_decomposed_name_needs_its_own_spelling() {
        let plain = index_of(&["see cafe.png"]);
        let decomposed = index_of(&["see cafe\u{301}.png"]);
        let name = "img/cafe\u{301}.png";

        assert_eq!(classify(name, &PhraseQuery::new(&plain)).unwrap(), Classification::Orphaned);
        assert_eq!(classify("cafe\u{301}.png", &PhraseQuery::new(&decomposed)).unwrap(), Classification::Referenced);
    }

    #[test]
    fn test_empty_corpus_orphans_everything() {
        let index = index_of(&[]);
        let detector = OrphanDetector::new(&index, 2);
        let candidates = vec![candidate("a.png"), candidate("b/c.pdf")];

        let classes = detector.classify_all(&candidates).unwrap();
        assert_eq!(classes, vec![Classification::Orphaned; 2]);
    }

    #[test]
    fn test_dry_run_report() {
        let index = index_of(&["uses img/cat.png"]);
        let detector = OrphanDetector::new(&index, 4);
        let candidates = vec![candidate("img/cat.png"), candidate("img/dog.png"), candidate("x.svg")];

        let report = detector.run(&candidates, true).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.examined, 3);
        assert_eq!(report.orphan_count(), 2);
        assert_eq!(report.orphans[0].relative, "img/dog.png");
        assert_eq!(report.orphans[1].relative, "x.svg");
        assert!(report.orphans.iter().all(|o| !o.deleted));
        assert!(report.deletion_failures.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let index = index_of(&["a/b.png and c.png"]);
        let detector = OrphanDetector::new(&index, 3);
        let candidates: Vec<_> = ["a/b.png", "c.png", "d.png", "a/c.png"]
            .iter()
            .map(|r| candidate(r))
            .collect();

        let first = detector.run(&candidates, true).unwrap();
        let second = detector.run(&candidates, true).unwrap();
        assert_eq!(first.orphans, second.orphans);
    }

    #[test]
    fn test_failed_deletion_is_reported_and_others_still_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("stale.png");
        let unused = dir.path().join("unused.png");
        std::fs::write(&stale, "x").unwrap();
        std::fs::write(&unused, "x").unwrap();

        let index = index_of(&["nothing references these"]);
        let detector = OrphanDetector::new(&index, 2);
        let candidates = vec![
            Candidate {
                path: dir.path().join("gone.png"),
                relative: "gone.png".to_string(),
            },
            Candidate {
                path: stale.clone(),
                relative: "stale.png".to_string(),
            },
            Candidate {
                path: unused.clone(),
                relative: "unused.png".to_string(),
            },
        ];

        let report = detector.run(&candidates, false).unwrap();
        assert!(!report.succeeded());
        assert_eq!(report.orphan_count(), 3);
        assert_eq!(report.deletion_failures.len(), 1);
        assert!(matches!(
            &report.deletion_failures[0],
            OrphanError::Deletion { path, .. } if path.ends_with("gone.png")
        ));

        let deleted: Vec<_> = report.orphans.iter().map(|o| (o.relative.as_str(), o.deleted)).collect();
        assert_eq!(deleted, vec![("gone.png", false), ("stale.png", true), ("unused.png", true)]);
        assert!(!stale.exists());
        assert!(!unused.exists());
    }

    #[test]
    fn test_dry_run_and_clean_delete_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let unused = dir.path().join("unused.png");
        std::fs::write(&unused, "x").unwrap();
        let candidates = vec![Candidate {
            path: unused.clone(),
            relative: "unused.png".to_string(),
        }];

        let index = index_of(&[]);
        let detector = OrphanDetector::new(&index, 1);
        assert!(detector.run(&candidates, true).unwrap().succeeded());
        assert!(unused.exists());
        assert!(detector.run(&candidates, false).unwrap().succeeded());
        assert!(!unused.exists());
    }

    #[test]
    fn test_unsearchable_candidate_fails_whole_run() {
        let index = index_of(&["anything"]);
        let detector = OrphanDetector::new(&index, 1);
        let candidates = vec![candidate("fine.png"), candidate("___")];

        let err = detector.run(&candidates, true).unwrap_err();
        assert!(matches!(err, OrphanError::Configuration(_)));
    }
}
