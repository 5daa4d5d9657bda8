//! Review-to-sample conversion.
//!
//! A [`Sample`] bundles the normalized word sequence, its character tensor
//! and the label. Each example is transformed independently, so a dataset is
//! processed with a rayon parallel iterator over a shared read-only
//! [`PipelineContext`].

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use super::chars::{expand_sequence, CharIndex};
use super::sequence::normalize_review;
use super::vocab::VocabularyIndex;
use crate::error::{PrepError, PrepResult};
use crate::Config;

/// A raw review: frequency ranks, all non-negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review(Vec<i64>);

impl Review {
    /// Validate and wrap raw tokens.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidToken`] for the first negative token.
    pub fn new(tokens: Vec<i64>) -> PrepResult<Self> {
        if let Some((position, &value)) = tokens.iter().enumerate().find(|&(_, &t)| t < 0) {
            return Err(PrepError::InvalidToken { position, value });
        }
        Ok(Self(tokens))
    }

    /// The raw tokens.
    #[must_use]
    pub fn tokens(&self) -> &[i64] {
        &self.0
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the review has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Binary sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    /// Parse `0` / `1`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidLabel`] for any other value.
    pub fn from_i64(value: i64) -> PrepResult<Self> {
        match value {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(PrepError::InvalidLabel(other)),
        }
    }

    /// `0` for negative, `1` for positive.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }
}

/// A review paired with its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub review: Review,
    pub label: Label,
}

impl Example {
    /// Validate raw tokens and a raw label.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidToken`] or [`PrepError::InvalidLabel`].
    pub fn from_raw(tokens: Vec<i64>, label: i64) -> PrepResult<Self> {
        Ok(Self {
            review: Review::new(tokens)?,
            label: Label::from_i64(label)?,
        })
    }
}

/// One preprocessed training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Normalized word indices, shape `(sequence_len,)`.
    pub words: Array1<i64>,
    /// Character codes, shape `(sequence_len, word_char_len)`.
    pub chars: Array2<i64>,
    pub label: Label,
}

/// Read-only state shared by every transform.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub config: Config,
    pub vocab: VocabularyIndex,
    pub chars: CharIndex,
}

impl PipelineContext {
    /// Bundle a validated config with the vocabulary and the character
    /// index for `config.unknown_char`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidConfig`] if the config fails validation.
    pub fn new(config: Config, vocab: VocabularyIndex) -> PrepResult<Self> {
        config.validate()?;
        let chars = CharIndex::lowercase_ascii(config.unknown_char);
        Ok(Self {
            config,
            vocab,
            chars,
        })
    }
}

/// Normalize one review and expand it to characters.
#[must_use]
pub fn preprocess_example(example: &Example, ctx: &PipelineContext) -> Sample {
    let words = normalize_review(example.review.tokens(), &ctx.config);
    let chars = expand_sequence(&words, &ctx.vocab, &ctx.chars, &ctx.config);
    Sample {
        words: Array1::from(words),
        chars,
        label: example.label,
    }
}

/// Preprocess every example across the rayon thread pool.
///
/// Output order matches input order.
#[must_use]
pub fn preprocess_dataset(examples: &[Example], ctx: &PipelineContext) -> Vec<Sample> {
    examples
        .par_iter()
        .map(|ex| preprocess_example(ex, ctx))
        .collect()
}

/// Single-threaded [`preprocess_dataset`].
#[must_use]
pub fn preprocess_dataset_sequential(examples: &[Example], ctx: &PipelineContext) -> Vec<Sample> {
    examples
        .iter()
        .map(|ex| preprocess_example(ex, ctx))
        .collect()
}

/// Samples stacked along a leading batch axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch {
    /// Shape `(n, sequence_len)`.
    pub words: Array2<i64>,
    /// Shape `(n, sequence_len, word_char_len)`.
    pub chars: Array3<i64>,
    /// Shape `(n,)`, values 0 or 1.
    pub labels: Array1<i64>,
}

impl SampleBatch {
    /// Stack samples into batch arrays.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::ShapeMismatch`] if `samples` is empty or the
    /// samples disagree in shape.
    pub fn from_samples(samples: &[Sample]) -> PrepResult<Self> {
        if samples.is_empty() {
            return Err(PrepError::ShapeMismatch("cannot batch zero samples".into()));
        }

        let word_views: Vec<ArrayView1<i64>> = samples.iter().map(|s| s.words.view()).collect();
        let char_views: Vec<ArrayView2<i64>> = samples.iter().map(|s| s.chars.view()).collect();

        let words = ndarray::stack(Axis(0), &word_views)
            .map_err(|e| PrepError::ShapeMismatch(format!("word sequences: {e}")))?;
        let chars = ndarray::stack(Axis(0), &char_views)
            .map_err(|e| PrepError::ShapeMismatch(format!("character tensors: {e}")))?;
        let labels = samples.iter().map(|s| s.label.as_i64()).collect();

        Ok(Self {
            words,
            chars,
            labels,
        })
    }

    /// Number of samples in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Split samples into consecutive batches of at most `batch_size`.
///
/// # Errors
///
/// Each item fails with [`PrepError::ShapeMismatch`] if its samples disagree
/// in shape.
///
/// # Panics
///
/// Panics if `batch_size` is 0.
pub fn batches(
    samples: &[Sample],
    batch_size: usize,
) -> impl Iterator<Item = PrepResult<SampleBatch>> + '_ {
    samples.chunks(batch_size).map(SampleBatch::from_samples)
}
