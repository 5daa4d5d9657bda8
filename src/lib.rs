//! # imdb-prep
//!
//! Word- and character-level preprocessing of the IMDB movie review dataset
//! for hybrid word+character embedding sentiment classifiers.
//!
//! ## Overview
//!
//! Each review arrives as a sequence of frequency ranks (1 = most frequent
//! word). The pipeline turns it into two fixed-shape tensors:
//!
//! ```text
//! words: (sequence_len,)                 start token, shifted ranks, OOV clamp, left pad
//! chars: (sequence_len, word_char_len)   each word spelled out as a-z -> 1..26, other -> 27
//! ```
//!
//! and builds an embedding matrix `(max_words, embedding_dim)` from a
//! pretrained word-vector table, falling back to small uniform noise.
//!
//! ## Structure
//!
//! - [`data`]: Vocabulary and character indices, normalization, expansion, embeddings, loaders
//! - [`export`]: JSON export of the embedding matrix and preprocessed splits
//! - [`framework`]: Conversion into `burn` tensors
//! - [`error`]: Error type shared by every fallible operation

pub mod data;
pub mod error;
pub mod export;
pub mod framework;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use data::{
    build_embedding_matrix, expand_sequence, expand_word, normalize_review, pad_sequence,
    preprocess_dataset, preprocess_example, CharIndex, EmbeddingMatrix, Example, ImdbDataset,
    Label, PipelineContext, PretrainedVectors, Review, Sample, SampleBatch, VocabularyIndex,
};
pub use error::{PrepError, PrepResult};

/// Preprocessing configuration.
///
/// Shared read-only by every transform through [`PipelineContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vocabulary cap: shifted values at or above this become `oov_char`.
    pub max_words: usize,
    /// Offset added to raw ranks to reserve low values for control tokens.
    pub index_from: i64,
    /// Start-of-review marker.
    pub start_char: i64,
    /// Out-of-vocabulary marker.
    pub oov_char: i64,
    /// Padding marker for word sequences.
    pub padding_value: i64,
    /// Fixed length of every normalized sequence.
    pub sequence_len: usize,
    /// Fixed number of characters per word.
    pub word_char_len: usize,
    /// Padding marker for character rows.
    pub char_padding: i64,
    /// Code for characters outside `a..z`.
    pub unknown_char: i64,
    /// Width of each embedding row.
    pub embedding_dim: usize,
    /// Half-width of the uniform range for rows without a pretrained vector.
    pub embedding_init_range: f32,
    /// Seed for the embedding fallback RNG; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_words: 5000,
            index_from: 3,
            start_char: 2,
            oov_char: 3,
            padding_value: 1,
            sequence_len: 500,
            word_char_len: 16,
            char_padding: 0,
            unknown_char: data::chars::UNKNOWN_CHAR,
            embedding_dim: 300,
            embedding_init_range: 0.05,
            seed: None,
        }
    }
}

impl Config {
    /// Check that every length and range is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> PrepResult<()> {
        if self.max_words == 0 {
            return Err(PrepError::InvalidConfig("max_words must be > 0".into()));
        }
        if self.sequence_len == 0 {
            return Err(PrepError::InvalidConfig("sequence_len must be > 0".into()));
        }
        if self.word_char_len == 0 {
            return Err(PrepError::InvalidConfig("word_char_len must be > 0".into()));
        }
        if self.embedding_dim == 0 {
            return Err(PrepError::InvalidConfig("embedding_dim must be > 0".into()));
        }
        if self.index_from < 0 {
            return Err(PrepError::InvalidConfig("index_from must be >= 0".into()));
        }
        // Control tokens must shift back to a rank below 1 so they never
        // resolve to a vocabulary word.
        for (name, value) in [
            ("padding_value", self.padding_value),
            ("start_char", self.start_char),
            ("oov_char", self.oov_char),
        ] {
            if value > self.index_from {
                return Err(PrepError::InvalidConfig(format!(
                    "{name} ({value}) must be <= index_from ({})",
                    self.index_from
                )));
            }
        }
        if self.oov_char >= i64::try_from(self.max_words).unwrap_or(i64::MAX) {
            return Err(PrepError::InvalidConfig(format!(
                "oov_char ({}) must be < max_words ({})",
                self.oov_char, self.max_words
            )));
        }
        if !self.embedding_init_range.is_finite() || self.embedding_init_range <= 0.0 {
            return Err(PrepError::InvalidConfig(format!(
                "embedding_init_range must be finite and > 0, got {}",
                self.embedding_init_range
            )));
        }
        Ok(())
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be read
    /// or parsed, or [`PrepError::InvalidConfig`] if the result fails validation.
    pub fn from_json_file(path: &Path) -> PrepResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
        let config: Config = serde_json::from_str(&json)
            .map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sequence_len, 500);
        assert_eq!(config.word_char_len, 16);
        assert_eq!(config.unknown_char, 27);
    }

    #[test]
    fn test_validate_rejects_zero_lengths() {
        let config = Config {
            sequence_len: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PrepError::InvalidConfig(_))));

        let config = Config {
            word_char_len: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_control_tokens_above_offset() {
        let config = Config {
            index_from: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PrepError::InvalidConfig(_))));

        let config = Config {
            start_char: 4,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        // equal to the offset shifts back to rank 0, which never resolves
        let config = Config {
            index_from: 5,
            oov_char: 5,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oov_at_cap() {
        let config = Config {
            max_words: 3,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(PrepError::InvalidConfig(_))));

        let config = Config {
            max_words: 4,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_init_range() {
        let config = Config {
            embedding_init_range: f32::NAN,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"max_words": 10000, "seed": 7}"#)
            .expect("parse partial config");
        assert_eq!(config.max_words, 10000);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.sequence_len, 500);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = Config::from_json_file(Path::new("/nonexistent/prep.json"));
        assert!(matches!(
            result,
            Err(PrepError::DataSourceUnavailable { .. })
        ));
    }
}
