//! Word vocabulary index for the IMDB dataset.
//!
//! Maps frequency ranks (1 = most frequent word) to word strings and back.
//! The source is a JSON object `{"word": rank, ...}` as published alongside
//! the Keras IMDB archive.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{PrepError, PrepResult};

/// Bidirectional rank <-> word index.
///
/// Invariant: the mapping is a bijection over positive ranks. Constructors
/// reject rank 0 and duplicate ranks or words.
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    rank_to_word: HashMap<usize, String>,
    word_to_rank: HashMap<String, usize>,
}

impl VocabularyIndex {
    /// Build an index from `(word, rank)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidVocabulary`] if a rank is 0 or a rank or
    /// word appears twice.
    pub fn from_pairs<I, S>(pairs: I) -> PrepResult<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut rank_to_word = HashMap::new();
        let mut word_to_rank = HashMap::new();

        for (word, rank) in pairs {
            let word = word.into();
            if rank == 0 {
                return Err(PrepError::InvalidVocabulary(format!(
                    "word {word:?} has rank 0, ranks start at 1"
                )));
            }
            if let Some(existing) = rank_to_word.get(&rank) {
                return Err(PrepError::InvalidVocabulary(format!(
                    "rank {rank} assigned to both {existing:?} and {word:?}"
                )));
            }
            if word_to_rank.contains_key(&word) {
                return Err(PrepError::InvalidVocabulary(format!(
                    "word {word:?} appears twice"
                )));
            }
            rank_to_word.insert(rank, word.clone());
            word_to_rank.insert(word, rank);
        }

        Ok(Self {
            rank_to_word,
            word_to_rank,
        })
    }

    /// Parse a JSON word index (`{"the": 1, "and": 2, ...}`).
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] if the JSON is malformed,
    /// or [`PrepError::InvalidVocabulary`] if it is not a bijection.
    pub fn from_json_str(json: &str) -> PrepResult<Self> {
        let raw: HashMap<String, usize> =
            serde_json::from_str(json).map_err(|e| PrepError::unavailable("word index", e))?;
        Self::from_pairs(raw)
    }

    /// Load a JSON word index from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be read
    /// or parsed.
    pub fn from_json_file(path: &Path) -> PrepResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
        let raw: HashMap<String, usize> = serde_json::from_str(&json)
            .map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
        let vocab = Self::from_pairs(raw)?;
        tracing::info!(
            path = %path.display(),
            words = vocab.len(),
            "loaded word index"
        );
        Ok(vocab)
    }

    /// Number of words in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rank_to_word.len()
    }

    /// Whether the index holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rank_to_word.is_empty()
    }

    /// Get the word for a rank, or `None` if no word has that rank.
    #[must_use]
    pub fn word(&self, rank: usize) -> Option<&str> {
        self.rank_to_word.get(&rank).map(String::as_str)
    }

    /// Get the rank of a word, or `None` if it is not in the index.
    #[must_use]
    pub fn rank(&self, word: &str) -> Option<usize> {
        self.word_to_rank.get(word).copied()
    }

    /// Resolve a possibly negative rank. Ranks below 1 never resolve.
    #[must_use]
    pub fn lookup(&self, rank: i64) -> Option<&str> {
        usize::try_from(rank).ok().and_then(|r| self.word(r))
    }

    /// Decode raw ranks back to text, `?` for unknown ranks.
    #[must_use]
    pub fn decode(&self, ranks: &[i64]) -> String {
        ranks
            .iter()
            .map(|&r| self.lookup(r).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
