//! Performance benchmarks for orphanmd
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use orphanmd::index::{DocumentStore, IndexReader, IndexScope, IndexWriter, InvertedIndex};
use orphanmd::query::PhraseQuery;
use std::path::Path;
use tempfile::TempDir;

/// A corpus of markdown-ish documents that mention some asset paths
fn create_benchmark_store(docs: usize) -> DocumentStore {
    let mut store = DocumentStore::new();
    for i in 0..docs {
        let text = format!(
            r#"# Page {i}

Some introductory prose for page {i}, linking to the next chapter.

![diagram](assets/img/diagram_{i}.png)

See [the manual](../assets/manual_{m}.pdf) and the notes in old/notes_{i}.md.
The quick brown fox jumps over the lazy dog {i} times.
"#,
            i = i,
            m = i % 10
        );
        store.add_document(format!("docs/page_{}.md", i), &text);
    }
    store
}

fn bench_tokenize(c: &mut Criterion) {
    let small = "see assets/img/cat.png for details";
    let large = small.repeat(1000);

    let mut group = c.benchmark_group("tokenize");
    group.bench_function("small", |b| {
        b.iter(|| orphanmd::utils::tokenize(black_box(small)).count())
    });
    group.bench_function("large_34kb", |b| {
        b.iter(|| orphanmd::utils::tokenize(black_box(&large)).count())
    });
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    for docs in [100, 1000] {
        let store = create_benchmark_store(docs);
        group.bench_with_input(BenchmarkId::from_parameter(docs), &store, |b, store| {
            b.iter(|| InvertedIndex::build(black_box(store)))
        });
    }
    group.finish();
}

fn bench_phrase_queries(c: &mut Criterion) {
    let store = create_benchmark_store(1000);
    let index = InvertedIndex::build(&store);
    let query = PhraseQuery::new(&index);

    let mut group = c.benchmark_group("phrase");

    // Referenced near the end of the corpus
    group.bench_function("referenced", |b| {
        b.iter(|| query.contains_phrase(black_box(&["img", "diagram", "999", "png"])))
    });

    // Every term is common but the sequence never occurs
    group.bench_function("orphan_common_terms", |b| {
        b.iter(|| query.contains_phrase(black_box(&["assets", "img", "manual", "1", "pdf"])))
    });

    // First term is absent from the dictionary
    group.bench_function("orphan_unknown_term", |b| {
        b.iter(|| query.contains_phrase(black_box(&["missing", "png"])))
    });

    group.finish();
}

fn persist(dir: &Path) {
    let store = create_benchmark_store(1000);
    let index = InvertedIndex::build(&store);
    IndexWriter::new(dir, &index)
        .write(&IndexScope {
            corpus_root: "docs".into(),
            candidate_root: "assets".into(),
            document_patterns: vec!["*.md".to_string()],
        })
        .expect("Failed to write index");
}

fn bench_persisted_index(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    persist(temp_dir.path());

    c.bench_function("index_open", |b| {
        b.iter(|| IndexReader::open(black_box(temp_dir.path())))
    });

    let reader = IndexReader::open(temp_dir.path()).expect("Failed to open index");
    let query = PhraseQuery::new(&reader);
    c.bench_function("phrase_from_disk", |b| {
        b.iter(|| query.contains_phrase(black_box(&["old", "notes", "500", "md"])))
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_index_build,
    bench_phrase_queries,
    bench_persisted_index,
);

criterion_main!(benches);
