//! IMDB dataset loading.
//!
//! ## JSON layout
//!
//! The four arrays of the Keras `imdb.npz` archive, exported as one object:
//! ```text
//! {
//!   "x_train": [[1, 14, 22, ...], ...],   reviews as frequency ranks
//!   "y_train": [1, 0, ...],               labels, 0 = negative, 1 = positive
//!   "x_test":  [[...], ...],
//!   "y_test":  [...]
//! }
//! ```
//! 25,000 reviews per split in the published dataset.

use serde::Deserialize;
use std::path::Path;

use super::samples::{Example, Label};
use crate::error::{PrepError, PrepResult};

#[derive(Debug, Deserialize)]
struct RawImdb {
    x_train: Vec<Vec<i64>>,
    y_train: Vec<i64>,
    x_test: Vec<Vec<i64>>,
    y_test: Vec<i64>,
}

/// Train and test splits of labeled reviews.
#[derive(Debug, Clone, Default)]
pub struct ImdbDataset {
    pub train: Vec<Example>,
    pub test: Vec<Example>,
}

impl ImdbDataset {
    /// Parse the JSON layout described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] for malformed JSON or
    /// mismatched review/label counts, and [`PrepError::InvalidToken`] or
    /// [`PrepError::InvalidLabel`] for out-of-range values.
    pub fn from_json_str(json: &str) -> PrepResult<Self> {
        let raw: RawImdb =
            serde_json::from_str(json).map_err(|e| PrepError::unavailable("imdb dataset", e))?;
        Ok(Self {
            train: zip_split("train", raw.x_train, raw.y_train)?,
            test: zip_split("test", raw.x_test, raw.y_test)?,
        })
    }

    /// Load the dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be read,
    /// or any error from [`ImdbDataset::from_json_str`].
    pub fn from_json_file(path: &Path) -> PrepResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
        let dataset = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            train = dataset.train.len(),
            test = dataset.test.len(),
            "loaded imdb dataset"
        );
        Ok(dataset)
    }

    /// Count of positive labels in `(train, test)`.
    #[must_use]
    pub fn positive_counts(&self) -> (usize, usize) {
        (count_positive(&self.train), count_positive(&self.test))
    }
}

fn count_positive(split: &[Example]) -> usize {
    split
        .iter()
        .filter(|ex| ex.label == Label::Positive)
        .count()
}

fn zip_split(name: &str, reviews: Vec<Vec<i64>>, labels: Vec<i64>) -> PrepResult<Vec<Example>> {
    if reviews.len() != labels.len() {
        return Err(PrepError::unavailable(
            "imdb dataset",
            format!(
                "{name} split has {} reviews but {} labels",
                reviews.len(),
                labels.len()
            ),
        ));
    }
    let examples = reviews
        .into_iter()
        .zip(labels)
        .map(|(tokens, label)| Example::from_raw(tokens, label))
        .collect::<PrepResult<Vec<_>>>()?;
    tracing::debug!(split = name, examples = examples.len(), "validated split");
    Ok(examples)
}
