//! Pretrained word vectors and the initial embedding matrix.
//!
//! ## Vector file format
//!
//! GloVe-style text, one word per line:
//! ```text
//! the 0.418 0.24968 -0.41242 ...
//! ```
//! A leading word2vec header (`<count> <dim>`) is skipped. The dimension is
//! taken from the first vector row, whose word must not contain spaces. Later
//! rows are split from the right, so tokens such as `at&t corp` in the larger
//! GloVe releases keep their spaces.
//!
//! ## Matrix layout
//!
//! Row `r - 1` holds vocabulary rank `r` for `r` in `1..=max_words`. Ranks
//! without a pretrained vector (or without a word at all) get a row drawn
//! uniformly from `[-init_range, init_range]`.

use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::vocab::VocabularyIndex;
use crate::error::{PrepError, PrepResult};
use crate::Config;

/// Pretrained word -> vector table with a fixed dimension.
#[derive(Debug, Clone)]
pub struct PretrainedVectors {
    dim: usize,
    vectors: HashMap<String, Array1<f32>>,
}

impl PretrainedVectors {
    /// An empty table: every word falls back to random initialization.
    #[must_use]
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            vectors: HashMap::new(),
        }
    }

    /// Build a table from `(word, vector)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::ShapeMismatch`] if a vector's length is not `dim`.
    pub fn from_pairs<I>(dim: usize, pairs: I) -> PrepResult<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut vectors = HashMap::new();
        for (word, v) in pairs {
            if v.len() != dim {
                return Err(PrepError::ShapeMismatch(format!(
                    "vector for {word:?} has {} components, expected {dim}",
                    v.len()
                )));
            }
            vectors.entry(word).or_insert_with(|| Array1::from(v));
        }
        Ok(Self { dim, vectors })
    }

    /// Parse GloVe-style text. The dimension is taken from the first row.
    ///
    /// Blank lines are skipped; a repeated word keeps its first vector.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::InvalidVectorRow`] for unparsable or ragged rows
    /// and [`PrepError::DataSourceUnavailable`] if reading fails.
    pub fn from_reader<R: BufRead>(reader: R) -> PrepResult<Self> {
        let mut dim: Option<usize> = None;
        let mut vectors = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| PrepError::unavailable("pretrained vectors", e))?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let (word, fields) = match dim {
                Some(d) => split_row(line, d),
                None => {
                    let mut parts = line.split(' ').filter(|p| !p.is_empty());
                    let word = parts.next().unwrap_or_default();
                    (word, parts.collect())
                }
            };

            if line_no == 1 && fields.len() == 1 && is_word2vec_header(word, fields[0]) {
                continue;
            }

            let values = fields
                .iter()
                .map(|p| p.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| PrepError::InvalidVectorRow {
                    line: line_no,
                    reason: e.to_string(),
                })?;

            if values.is_empty() {
                return Err(PrepError::InvalidVectorRow {
                    line: line_no,
                    reason: format!("word {word:?} has no components"),
                });
            }

            let expected = *dim.get_or_insert(values.len());
            if values.len() != expected || word.is_empty() {
                return Err(PrepError::InvalidVectorRow {
                    line: line_no,
                    reason: format!("{} components, expected {expected}", values.len()),
                });
            }

            vectors
                .entry(word.to_string())
                .or_insert_with(|| Array1::from(values));
        }

        Ok(Self {
            dim: dim.unwrap_or(0),
            vectors,
        })
    }

    /// Load a GloVe-style text file.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be opened,
    /// or any error from [`PretrainedVectors::from_reader`].
    pub fn from_file(path: &Path) -> PrepResult<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
        let table = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            words = table.len(),
            dim = table.dim(),
            "loaded pretrained vectors"
        );
        Ok(table)
    }

    /// Vector width.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of words with a vector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the table holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Get the vector for a word, or `None` if the table has none.
    #[must_use]
    pub fn get(&self, word: &str) -> Option<&Array1<f32>> {
        self.vectors.get(word)
    }
}

/// Split a row into the word and its last `dim` fields, so a word may itself
/// contain spaces. A short row yields fewer than `dim` fields.
fn split_row(line: &str, dim: usize) -> (&str, Vec<&str>) {
    let mut fields: Vec<&str> = line.rsplitn(dim + 1, ' ').collect();
    if fields.len() <= dim {
        // no word at all: every field is a value
        fields.reverse();
        return ("", fields);
    }
    let word = fields.pop().unwrap_or_default();
    fields.reverse();
    (word, fields)
}

fn is_word2vec_header(first: &str, second: &str) -> bool {
    first.parse::<usize>().is_ok() && second.parse::<usize>().is_ok()
}

/// Embedding matrix plus pretrained coverage counts.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    /// Shape `(max_words, embedding_dim)`.
    pub weights: Array2<f32>,
    /// Rows copied from the pretrained table.
    pub pretrained_rows: usize,
    /// Rows drawn at random.
    pub random_rows: usize,
}

impl EmbeddingMatrix {
    /// Fraction of rows taken from the pretrained table.
    #[must_use]
    pub fn coverage(&self) -> f32 {
        let total = self.pretrained_rows + self.random_rows;
        if total == 0 {
            return 0.0;
        }
        self.pretrained_rows as f32 / total as f32
    }
}

/// RNG for random rows: seeded when `seed` is set, from entropy otherwise.
#[must_use]
pub fn embedding_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Build the `(max_words, embedding_dim)` embedding matrix.
///
/// # Errors
///
/// Returns [`PrepError::InvalidConfig`] if the config is invalid or a
/// non-empty pretrained table has a different dimension than
/// `config.embedding_dim`.
pub fn build_embedding_matrix<R: Rng + ?Sized>(
    vocab: &VocabularyIndex,
    pretrained: &PretrainedVectors,
    config: &Config,
    rng: &mut R,
) -> PrepResult<EmbeddingMatrix> {
    config.validate()?;
    if !pretrained.is_empty() && pretrained.dim() != config.embedding_dim {
        return Err(PrepError::InvalidConfig(format!(
            "pretrained vectors have dim {}, embedding_dim is {}",
            pretrained.dim(),
            config.embedding_dim
        )));
    }

    let dim = config.embedding_dim;
    let range = config.embedding_init_range;
    let dist = Uniform::new_inclusive(-range, range);

    let mut weights = Array2::zeros((config.max_words, dim));
    let mut pretrained_rows = 0;
    let mut random_rows = 0;

    for (row, rank) in (1..=config.max_words).enumerate() {
        match vocab.word(rank).and_then(|w| pretrained.get(w)) {
            Some(v) => {
                weights.row_mut(row).assign(v);
                pretrained_rows += 1;
            }
            None => {
                let v = Array1::random_using(dim, &dist, rng);
                weights.row_mut(row).assign(&v);
                random_rows += 1;
            }
        }
    }

    if pretrained_rows == 0 {
        tracing::warn!(
            rows = config.max_words,
            "no vocabulary word has a pretrained vector, matrix is fully random"
        );
    }
    tracing::info!(
        rows = config.max_words,
        dim,
        pretrained_rows,
        random_rows,
        "built embedding matrix"
    );

    Ok(EmbeddingMatrix {
        weights,
        pretrained_rows,
        random_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_glove_rows() {
        let text = "the 0.1 0.2 0.3\nmovie -0.5 0.0 1.5\n\n";
        let table = PretrainedVectors::from_reader(Cursor::new(text)).expect("parse");
        assert_eq!(table.dim(), 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("movie").expect("present")[2], 1.5);
        assert!(table.get("plot").is_none());
    }

    #[test]
    fn test_parse_skips_word2vec_header() {
        let text = "2 2\nthe 0.1 0.2\nand 0.3 0.4\n";
        let table = PretrainedVectors::from_reader(Cursor::new(text)).expect("parse");
        assert_eq!(table.dim(), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_rejects_ragged_row() {
        let text = "the 0.1 0.2\nand 0.3\n";
        let result = PretrainedVectors::from_reader(Cursor::new(text));
        assert!(matches!(
            result,
            Err(PrepError::InvalidVectorRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_word_with_spaces() {
        let text = "the 0.1 0.2\nat&t corp 0.3 0.4\n. . . -0.5 0.6\n";
        let table = PretrainedVectors::from_reader(Cursor::new(text)).expect("parse");
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("at&t corp").expect("present")[1], 0.4);
        assert_eq!(table.get(". . .").expect("present")[0], -0.5);
        assert!(table.get("at&t").is_none());
    }

    #[test]
    fn test_parse_rejects_row_without_word() {
        let text = "the 0.1 0.2\n0.3 0.4\n";
        let result = PretrainedVectors::from_reader(Cursor::new(text));
        assert!(matches!(
            result,
            Err(PrepError::InvalidVectorRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let text = "the 0.1 abc\n";
        let result = PretrainedVectors::from_reader(Cursor::new(text));
        assert!(matches!(
            result,
            Err(PrepError::InvalidVectorRow { line: 1, .. })
        ));
    }

    #[test]
    fn test_from_pairs_dim_check() {
        let result = PretrainedVectors::from_pairs(2, [("the".to_string(), vec![0.1])]);
        assert!(matches!(result, Err(PrepError::ShapeMismatch(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = PretrainedVectors::from_file(Path::new("/nonexistent/glove.txt"));
        assert!(matches!(
            result,
            Err(PrepError::DataSourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_build_rejects_dim_mismatch() {
        let vocab = VocabularyIndex::from_pairs([("the", 1)]).expect("vocab");
        let table = PretrainedVectors::from_pairs(3, [("the".to_string(), vec![0.1, 0.2, 0.3])])
            .expect("table");
        let config = Config {
            max_words: 4,
            embedding_dim: 5,
            ..Config::default()
        };
        let result = build_embedding_matrix(&vocab, &table, &config, &mut embedding_rng(Some(1)));
        assert!(matches!(result, Err(PrepError::InvalidConfig(_))));
    }

    #[test]
    fn test_seeded_build_is_reproducible() {
        let vocab = VocabularyIndex::from_pairs([("the", 1)]).expect("vocab");
        let config = Config {
            max_words: 8,
            embedding_dim: 4,
            ..Config::default()
        };
        let table = PretrainedVectors::empty(4);
        let a = build_embedding_matrix(&vocab, &table, &config, &mut embedding_rng(Some(42)))
            .expect("build");
        let b = build_embedding_matrix(&vocab, &table, &config, &mut embedding_rng(Some(42)))
            .expect("build");
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.random_rows, 8);
        assert_eq!(a.coverage(), 0.0);
    }
}
