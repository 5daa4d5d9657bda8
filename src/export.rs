//! JSON export of the embedding matrix and preprocessed splits.
//!
//! ndarray arrays are stored as nested `Vec`s so the files can be read by any
//! training front end without an ndarray-aware deserializer.
//!
//! ## Split layout
//!
//! A split is written as JSON lines: a header line carrying the config, then
//! one line per sample.
//! ```text
//! {"config":{"max_words":5000,...}}
//! {"words":[1,1,...,2,14],"chars":[[0,...],...],"label":1}
//! ...
//! ```
//! [`export_split`] preprocesses and writes one chunk of examples at a time,
//! so only a chunk of character tensors is ever resident.

use ndarray::{Array1, Array2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::data::embedding::EmbeddingMatrix;
use crate::data::samples::{
    preprocess_dataset, Example, Label, PipelineContext, Sample, SampleBatch,
};
use crate::error::{PrepError, PrepResult};
use crate::Config;

/// Serializable embedding matrix.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddingData {
    /// Number of rows (vocabulary cap).
    pub max_words: usize,
    /// Row width.
    pub embedding_dim: usize,
    /// Rows copied from the pretrained table.
    pub pretrained_rows: usize,
    /// Row `r - 1` is the vector for rank `r`.
    pub weights: Vec<Vec<f32>>,
}

/// First line of an exported split.
#[derive(Debug, Serialize, Deserialize)]
pub struct SplitHeader {
    /// Config the samples were produced with.
    pub config: Config,
}

/// One exported sample.
#[derive(Debug, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Normalized sequence, `sequence_len` values.
    pub words: Vec<i64>,
    /// `(sequence_len, word_char_len)` character codes.
    pub chars: Vec<Vec<i64>>,
    /// 0 or 1.
    pub label: i64,
}

/// Convert an Array2 to Vec<Vec<T>> for serialization.
fn array2_to_vecs<T: Clone>(arr: &Array2<T>) -> Vec<Vec<T>> {
    arr.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Convert Vec<Vec<T>> back to Array2.
fn vecs_to_array2<T: Clone>(vecs: &[Vec<T>], ncols: usize) -> PrepResult<Array2<T>> {
    let nrows = vecs.len();
    let flat: Vec<T> = vecs.iter().flat_map(|r| r.iter().cloned()).collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| PrepError::ShapeMismatch(format!("failed to reconstruct matrix: {e}")))
}

fn create_file(path: &Path) -> PrepResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| PrepError::unavailable(parent.display().to_string(), e))?;
    }
    let file =
        File::create(path).map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
    Ok(BufWriter::new(file))
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> PrepResult<()> {
    let mut writer = create_file(path)?;
    serde_json::to_writer(&mut writer, value)
        .map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
    writer
        .flush()
        .map_err(|e| PrepError::unavailable(path.display().to_string(), e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> PrepResult<T> {
    let file =
        File::open(path).map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PrepError::unavailable(path.display().to_string(), e))
}

/// Save an embedding matrix to a JSON file, creating parent directories.
///
/// # Errors
///
/// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be written.
pub fn save_embedding_matrix(matrix: &EmbeddingMatrix, path: &Path) -> PrepResult<()> {
    let (max_words, embedding_dim) = matrix.weights.dim();
    let data = EmbeddingData {
        max_words,
        embedding_dim,
        pretrained_rows: matrix.pretrained_rows,
        weights: array2_to_vecs(&matrix.weights),
    };
    write_json(&data, path)?;
    tracing::info!(path = %path.display(), max_words, embedding_dim, "saved embedding matrix");
    Ok(())
}

/// Load an embedding matrix saved by [`save_embedding_matrix`].
///
/// # Errors
///
/// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be read or
/// parsed, or [`PrepError::ShapeMismatch`] if the rows are ragged or disagree
/// with the stored dimensions.
pub fn load_embedding_matrix(path: &Path) -> PrepResult<EmbeddingMatrix> {
    let data: EmbeddingData = read_json(path)?;
    if data.weights.len() != data.max_words {
        return Err(PrepError::ShapeMismatch(format!(
            "{} rows stored, header says {}",
            data.weights.len(),
            data.max_words
        )));
    }
    let weights = vecs_to_array2(&data.weights, data.embedding_dim)?;
    Ok(EmbeddingMatrix {
        weights,
        pretrained_rows: data.pretrained_rows,
        random_rows: data.max_words.saturating_sub(data.pretrained_rows),
    })
}

/// Incremental writer for one exported split.
pub struct SampleWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    written: usize,
}

impl SampleWriter {
    /// Create the file (and parent directories) and write the config header.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be written.
    pub fn create(path: &Path, config: &Config) -> PrepResult<Self> {
        let mut out = Self {
            writer: create_file(path)?,
            path: path.to_path_buf(),
            written: 0,
        };
        out.write_line(&SplitHeader {
            config: config.clone(),
        })?;
        Ok(out)
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> PrepResult<()> {
        serde_json::to_writer(&mut self.writer, value)
            .map_err(|e| PrepError::unavailable(self.path.display().to_string(), e))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| PrepError::unavailable(self.path.display().to_string(), e))
    }

    /// Append one sample.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] if the write fails.
    pub fn write_sample(&mut self, sample: &Sample) -> PrepResult<()> {
        let record = SampleRecord {
            words: sample.words.to_vec(),
            chars: array2_to_vecs(&sample.chars),
            label: sample.label.as_i64(),
        };
        self.write_line(&record)?;
        self.written += 1;
        Ok(())
    }

    /// Samples written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered output and return the number of samples written.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::DataSourceUnavailable`] if the flush fails.
    pub fn finish(mut self) -> PrepResult<usize> {
        self.writer
            .flush()
            .map_err(|e| PrepError::unavailable(self.path.display().to_string(), e))?;
        Ok(self.written)
    }
}

/// Save preprocessed samples and the config that produced them.
///
/// # Errors
///
/// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be written.
pub fn save_samples(samples: &[Sample], config: &Config, path: &Path) -> PrepResult<()> {
    let mut writer = SampleWriter::create(path, config)?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    let n = writer.finish()?;
    tracing::info!(path = %path.display(), samples = n, "saved samples");
    Ok(())
}

/// Preprocess `examples` in chunks of `chunk_size` and stream them to `path`.
///
/// Each chunk runs through [`preprocess_dataset`], is stacked into a
/// [`SampleBatch`] to check its shapes, written, then dropped.
///
/// # Errors
///
/// Returns [`PrepError::InvalidConfig`] if `chunk_size` is 0,
/// [`PrepError::ShapeMismatch`] if a chunk does not stack, or
/// [`PrepError::DataSourceUnavailable`] if the file cannot be written.
pub fn export_split(
    examples: &[Example],
    ctx: &PipelineContext,
    chunk_size: usize,
    path: &Path,
) -> PrepResult<usize> {
    if chunk_size == 0 {
        return Err(PrepError::InvalidConfig("chunk_size must be > 0".into()));
    }
    let mut writer = SampleWriter::create(path, &ctx.config)?;
    for (i, chunk) in examples.chunks(chunk_size).enumerate() {
        let samples = preprocess_dataset(chunk, ctx);
        SampleBatch::from_samples(&samples)?;
        for sample in &samples {
            writer.write_sample(sample)?;
        }
        tracing::debug!(chunk = i, written = writer.written(), "wrote chunk");
    }
    let n = writer.finish()?;
    tracing::info!(path = %path.display(), samples = n, "exported split");
    Ok(n)
}

/// Load samples saved by [`save_samples`] or [`export_split`].
///
/// # Errors
///
/// Returns [`PrepError::DataSourceUnavailable`] if the file cannot be read or
/// a line cannot be parsed, [`PrepError::InvalidLabel`] for a stored label
/// outside `{0, 1}`, or [`PrepError::ShapeMismatch`] if any array disagrees
/// with the stored config.
pub fn load_samples(path: &Path) -> PrepResult<(Config, Vec<Sample>)> {
    let file =
        File::open(path).map_err(|e| PrepError::unavailable(path.display().to_string(), e))?;
    let mut lines = BufReader::new(file).lines().enumerate();
    let source = path.display().to_string();
    let parse_err = |line: usize, e: &dyn std::fmt::Display| {
        PrepError::unavailable(source.clone(), format!("line {line}: {e}"))
    };

    let header: SplitHeader = match lines.next() {
        Some((_, line)) => {
            let line = line.map_err(|e| parse_err(1, &e))?;
            serde_json::from_str(&line).map_err(|e| parse_err(1, &e))?
        }
        None => return Err(PrepError::unavailable(source.clone(), "missing header line")),
    };
    let config = header.config;
    let seq_len = config.sequence_len;

    let mut samples = Vec::new();
    for (i, line) in lines {
        let line_no = i + 1;
        let line = line.map_err(|e| parse_err(line_no, &e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: SampleRecord =
            serde_json::from_str(&line).map_err(|e| parse_err(line_no, &e))?;
        if record.words.len() != seq_len || record.chars.len() != seq_len {
            return Err(PrepError::ShapeMismatch(format!(
                "line {line_no}: {} words and {} char rows, expected {seq_len}",
                record.words.len(),
                record.chars.len()
            )));
        }
        samples.push(Sample {
            words: Array1::from(record.words),
            chars: vecs_to_array2(&record.chars, config.word_char_len)?,
            label: Label::from_i64(record.label)?,
        });
    }

    Ok((config, samples))
}
