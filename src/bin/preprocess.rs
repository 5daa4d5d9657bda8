//! IMDB preprocessing binary.
//!
//! Loads the integer-encoded dataset, the word index and (optionally) a
//! pretrained vector file, then writes the embedding matrix as JSON and both
//! preprocessed splits as JSON lines for the training front end. Splits are
//! processed one chunk at a time.

use anyhow::Context;
use clap::Parser;
use imdb_prep::data::embedding::embedding_rng;
use imdb_prep::export::{export_split, save_embedding_matrix};
use imdb_prep::{
    build_embedding_matrix, Config, ImdbDataset, PipelineContext, PretrainedVectors,
    VocabularyIndex,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "imdb-prep",
    about = "Preprocess IMDB reviews into word and character index tensors"
)]
struct Args {
    /// Dataset JSON with x_train, y_train, x_test, y_test
    #[arg(long)]
    dataset: PathBuf,

    /// Word index JSON (word -> frequency rank)
    #[arg(long)]
    word_index: PathBuf,

    /// Pretrained vectors (GloVe text format); omit for random initialization
    #[arg(long)]
    vectors: Option<PathBuf>,

    /// Config JSON; command-line overrides take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "data/prepared")]
    out_dir: PathBuf,

    /// Vocabulary cap
    #[arg(long)]
    max_words: Option<usize>,

    /// Words per review after padding/truncation
    #[arg(long)]
    sequence_len: Option<usize>,

    /// Characters per word after padding/truncation
    #[arg(long)]
    word_char_len: Option<usize>,

    /// Embedding width (must match the vectors file)
    #[arg(long)]
    embedding_dim: Option<usize>,

    /// Seed for random embedding rows
    #[arg(long)]
    seed: Option<u64>,

    /// Examples preprocessed and written per chunk
    #[arg(long, default_value_t = 1024)]
    chunk_size: usize,
}

impl Args {
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(v) = self.max_words {
            config.max_words = v;
        }
        if let Some(v) = self.sequence_len {
            config.sequence_len = v;
        }
        if let Some(v) = self.word_char_len {
            config.word_char_len = v;
        }
        if let Some(v) = self.embedding_dim {
            config.embedding_dim = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.chunk_size == 0 {
        anyhow::bail!("chunk_size must be > 0");
    }
    let config = args.resolve_config()?;

    tracing::info!(
        max_words = config.max_words,
        sequence_len = config.sequence_len,
        word_char_len = config.word_char_len,
        embedding_dim = config.embedding_dim,
        seed = ?config.seed,
        "imdb preprocessing"
    );

    // All sources load before any transform runs.
    let vocab = VocabularyIndex::from_json_file(&args.word_index)
        .with_context(|| format!("loading word index {}", args.word_index.display()))?;
    let dataset = ImdbDataset::from_json_file(&args.dataset)
        .with_context(|| format!("loading dataset {}", args.dataset.display()))?;
    let pretrained = match &args.vectors {
        Some(path) => PretrainedVectors::from_file(path)
            .with_context(|| format!("loading vectors {}", path.display()))?,
        None => PretrainedVectors::empty(config.embedding_dim),
    };

    let mut rng = embedding_rng(config.seed);
    let matrix = build_embedding_matrix(&vocab, &pretrained, &config, &mut rng)?;
    tracing::info!(
        coverage_pct = matrix.coverage() * 100.0,
        "embedding coverage"
    );

    save_embedding_matrix(&matrix, &args.out_dir.join("embedding.json"))?;
    drop(matrix);
    drop(pretrained);

    let (pos_train, pos_test) = dataset.positive_counts();
    tracing::info!(pos_train, pos_test, "positive labels");

    let ctx = PipelineContext::new(config, vocab)?;
    for (name, split) in [("train", &dataset.train), ("test", &dataset.test)] {
        let start = Instant::now();
        let path = args.out_dir.join(format!("{name}.jsonl"));
        let written = export_split(split, &ctx, args.chunk_size, &path)
            .with_context(|| format!("exporting {name} split to {}", path.display()))?;
        tracing::info!(
            split = name,
            samples = written,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "preprocessed split"
        );
    }

    tracing::info!(out_dir = %args.out_dir.display(), "done");
    Ok(())
}
