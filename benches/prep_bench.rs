//! Criterion benchmarks for IMDB preprocessing: sequential vs parallel.
//!
//! Run with: `cargo bench --bench prep_bench`
//!
//! ## Benchmarks
//!
//! 1. **Single review**: normalize + character expansion of one review
//! 2. **Dataset preprocessing**: sequential vs rayon over 1,000 reviews
//! 3. **Embedding matrix**: random-only build at the default cap

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imdb_prep::data::embedding::embedding_rng;
use imdb_prep::data::samples::preprocess_dataset_sequential;
use imdb_prep::{
    build_embedding_matrix, preprocess_dataset, preprocess_example, Config, Example,
    PipelineContext, PretrainedVectors, VocabularyIndex,
};
use rand::{Rng, SeedableRng};

/// Synthetic vocabulary of `n` distinct words.
fn synthetic_vocab(n: usize) -> VocabularyIndex {
    let pairs = (1..=n).map(|rank| (format!("word{rank}"), rank));
    VocabularyIndex::from_pairs(pairs).expect("synthetic vocab")
}

/// Reviews with lengths spread around the IMDB median (~230 tokens).
fn synthetic_examples(n: usize) -> Vec<Example> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    (0..n)
        .map(|i| {
            let len = rng.gen_range(20..900);
            let tokens = (0..len).map(|_| rng.gen_range(1..20_000)).collect();
            Example::from_raw(tokens, (i % 2) as i64).expect("synthetic example")
        })
        .collect()
}

fn bench_context() -> PipelineContext {
    PipelineContext::new(Config::default(), synthetic_vocab(10_000)).expect("context")
}

// ============================================================================
// Benchmark: Single Review
// ============================================================================

fn bench_single_review(c: &mut Criterion) {
    let ctx = bench_context();
    let example = &synthetic_examples(1)[0];

    c.bench_function("single_review_500x16", |b| {
        b.iter(|| preprocess_example(black_box(example), black_box(&ctx)));
    });
}

// ============================================================================
// Benchmark: Sequential vs Parallel Dataset Preprocessing
// ============================================================================

fn bench_dataset(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset");
    group.sample_size(10);
    let ctx = bench_context();

    for n in [100usize, 1000] {
        let examples = synthetic_examples(n);

        group.bench_with_input(BenchmarkId::new("sequential", n), &examples, |b, ex| {
            b.iter(|| preprocess_dataset_sequential(black_box(ex), black_box(&ctx)));
        });

        group.bench_with_input(BenchmarkId::new("parallel", n), &examples, |b, ex| {
            b.iter(|| preprocess_dataset(black_box(ex), black_box(&ctx)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Embedding Matrix
// ============================================================================

fn bench_embedding(c: &mut Criterion) {
    let vocab = synthetic_vocab(5000);
    let config = Config {
        seed: Some(1),
        ..Config::default()
    };
    let table = PretrainedVectors::empty(config.embedding_dim);

    c.bench_function("embedding_random_5000x300", |b| {
        b.iter(|| {
            let mut rng = embedding_rng(config.seed);
            build_embedding_matrix(black_box(&vocab), &table, &config, &mut rng)
                .expect("build failed")
        });
    });
}

criterion_group!(benches, bench_single_review, bench_dataset, bench_embedding);
criterion_main!(benches);
