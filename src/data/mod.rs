//! Dataset loading, vocabularies, and per-review preprocessing.
//!
//! ## Submodules
//!
//! - [`vocab`]: Word rank <-> string index
//! - [`chars`]: Character index and word-to-character expansion
//! - [`sequence`]: Shift, OOV clamp, and pad/truncate of word sequences
//! - [`embedding`]: Pretrained vectors and the initial embedding matrix
//! - [`samples`]: Review/label types, per-example pipeline, batching
//! - [`imdb`]: IMDB dataset loader

pub mod chars;
pub mod embedding;
pub mod imdb;
pub mod samples;
pub mod sequence;
pub mod vocab;

pub use chars::{expand_sequence, expand_word, CharIndex, UNKNOWN_CHAR};
pub use embedding::{build_embedding_matrix, embedding_rng, EmbeddingMatrix, PretrainedVectors};
pub use imdb::ImdbDataset;
pub use samples::{
    batches, preprocess_dataset, preprocess_dataset_sequential, preprocess_example, Example,
    Label, PipelineContext, Review, Sample, SampleBatch,
};
pub use sequence::{normalize_review, pad_sequence, replace_oov, shift_and_mark};
pub use vocab::VocabularyIndex;
