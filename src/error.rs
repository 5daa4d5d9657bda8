//! Error types for imdb-prep.
//!
//! Lookup misses (unknown rank, unknown character, word without a pretrained
//! vector) are routine and never surface here.

/// Result type alias using [`PrepError`].
pub type PrepResult<T> = Result<T, PrepError>;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    /// A raw review contained a negative token.
    #[error("invalid token {value} at position {position}")]
    InvalidToken { position: usize, value: i64 },

    /// A label outside `{0, 1}`.
    #[error("invalid label {0}, expected 0 or 1")]
    InvalidLabel(i64),

    /// The word index is not a bijection over positive ranks.
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    /// A malformed row in a pretrained vector file.
    #[error("invalid vector row at line {line}: {reason}")]
    InvalidVectorRow { line: usize, reason: String },

    /// Invalid pipeline configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Shape mismatch when stacking or reconstructing arrays.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Dataset, vocabulary, vector or export file missing, unreadable or corrupt.
    #[error("data source {source_name} unavailable: {reason}")]
    DataSourceUnavailable { source_name: String, reason: String },
}

impl PrepError {
    /// Build a [`PrepError::DataSourceUnavailable`] for a named source.
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        PrepError::DataSourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_token() {
        let err = PrepError::InvalidToken {
            position: 4,
            value: -2,
        };
        assert_eq!(err.to_string(), "invalid token -2 at position 4");
    }

    #[test]
    fn test_unavailable_helper() {
        let err = PrepError::unavailable("word_index.json", "No such file");
        assert_eq!(
            err.to_string(),
            "data source word_index.json unavailable: No such file"
        );
    }
}
